#![forbid(unsafe_code)]

mod support;

use serde_json::json;
use support::{Server, assert_api_error};

#[test]
fn create_detail_update_round_trip() {
    let server = Server::start("project_round_trip");
    let director = server.bootstrap_director();

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Refonte du site de la coopérative",
            "description": "Nouvelle identité visuelle et site statique pour la coopérative.",
            "budget": 1200000.0,
            "estimatedHours": 120.0,
            "priority": "HAUTE",
            "clientName": "Coopérative du Littoral",
        }),
    );
    assert_eq!(status, 201, "create: {body}");
    assert_eq!(body["id"], "PRJ-001");
    assert_eq!(body["status"], "A_FAIRE");
    assert_eq!(body["priority"], "HAUTE");
    assert_eq!(body["budget"], 1200000.0);
    assert_eq!(body["budgetUsed"], 0.0);
    assert_eq!(body["actualHours"], 0.0);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["creator"]["firstName"], "Paule");
    assert!(body["manager"].is_null());
    assert!(body["startDate"].is_null());

    let (status, body) = server.get("/api/projects/PRJ-001", Some(&director));
    assert_eq!(status, 200, "detail: {body}");
    assert_eq!(body["clientName"], "Coopérative du Littoral");
    assert_eq!(body["tasks"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["transactions"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["counts"]["tasks"], 0);
    assert_eq!(body["counts"]["transactions"], 0);

    let (status, body) = server.put(
        "/api/projects/PRJ-001",
        Some(&director),
        json!({ "title": "Refonte complète du site", "status": "EN_COURS" }),
    );
    assert_eq!(status, 200, "update: {body}");
    assert_eq!(body["title"], "Refonte complète du site");
    assert_eq!(body["status"], "EN_COURS");

    let (status, body) = server.put(
        "/api/projects/PRJ-001",
        Some(&director),
        json!({ "status": "PAUSE" }),
    );
    assert_api_error(status, &body, 400, "Statut invalide");

    let (status, body) = server.get("/api/projects/PRJ-404", Some(&director));
    assert_api_error(status, &body, 404, "Projet non trouvé");
}

#[test]
fn create_validations() {
    let server = Server::start("project_create_validations");
    let director = server.bootstrap_director();

    let base = json!({
        "title": "Campagne de lancement",
        "description": "Campagne réseaux sociaux sur six semaines.",
        "budget": 400000.0,
        "estimatedHours": 60.0,
    });

    let mut short_title = base.clone();
    short_title["title"] = json!("Ab");
    let (status, body) = server.post("/api/projects", Some(&director), short_title);
    assert_api_error(status, &body, 400, "Le titre doit contenir au moins 3 caractères");

    let mut short_description = base.clone();
    short_description["description"] = json!("trop court");
    let (status, body) = server.post("/api/projects", Some(&director), short_description);
    assert_eq!(status, 201, "ten chars is enough: {body}");

    let mut tiny_description = base.clone();
    tiny_description["description"] = json!("court");
    let (status, body) = server.post("/api/projects", Some(&director), tiny_description);
    assert_api_error(
        status,
        &body,
        400,
        "La description doit contenir au moins 10 caractères",
    );

    let mut negative_budget = base.clone();
    negative_budget["budget"] = json!(-1.0);
    let (status, body) = server.post("/api/projects", Some(&director), negative_budget);
    assert_api_error(status, &body, 400, "Le budget doit être positif");

    let mut zero_hours = base.clone();
    zero_hours["estimatedHours"] = json!(0.0);
    let (status, body) = server.post("/api/projects", Some(&director), zero_hours);
    assert_api_error(
        status,
        &body,
        400,
        "Les heures estimées doivent être supérieures à 0",
    );

    let mut bad_client_email = base.clone();
    bad_client_email["clientEmail"] = json!("pas-un-email");
    let (status, body) = server.post("/api/projects", Some(&director), bad_client_email);
    assert_api_error(status, &body, 400, "Email client invalide");

    let mut bad_deadline = base.clone();
    bad_deadline["deadline"] = json!("hier");
    let (status, body) = server.post("/api/projects", Some(&director), bad_deadline);
    assert_api_error(status, &body, 400, "Date limite invalide");

    let mut ghost_manager = base.clone();
    ghost_manager["managerId"] = json!("USR-999");
    let (status, body) = server.post("/api/projects", Some(&director), ghost_manager);
    assert_api_error(status, &body, 404, "Utilisateur non trouvé");
}

#[test]
fn list_scopes_to_involved_users() {
    let server = Server::start("project_list_scope");
    let director = server.bootstrap_director();
    let (consultant, consultant_user, _) =
        server.bootstrap_consultant("brice@atelier.test", 40000.0);

    for (title, description) in [
        ("Portail de réservation", "Réservation en ligne pour le centre culturel."),
        ("Application de caisse", "Caisse tactile pour les restaurants partenaires."),
        ("Audit de sécurité", "Revue complète de l'infrastructure du client."),
    ] {
        let (status, _) = server.post(
            "/api/projects",
            Some(&director),
            json!({
                "title": title,
                "description": description,
                "budget": 900000.0,
                "estimatedHours": 80.0,
            }),
        );
        assert_eq!(status, 201);
    }

    let (status, body) = server.get("/api/projects", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["projects"].as_array().map(Vec::len), Some(3));

    // Not involved anywhere yet.
    let (status, body) = server.get("/api/projects", Some(&consultant));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 0);

    let (status, _) = server.post(
        "/api/projects/PRJ-002/tasks",
        Some(&director),
        json!({
            "title": "Écran d'encaissement",
            "description": "Premier lot de l'application.",
            "estimatedHours": 12.0,
            "assignedUserId": consultant_user,
        }),
    );
    assert_eq!(status, 201);

    let (status, body) = server.get("/api/projects", Some(&consultant));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["projects"][0]["id"], "PRJ-002");
    assert_eq!(body["projects"][0]["counts"]["tasks"], 1);
    assert_eq!(
        body["projects"][0]["tasks"][0]["assignee"]["firstName"],
        "Brice"
    );

    let (status, body) = server.get("/api/projects?search=caisse", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["projects"][0]["title"], "Application de caisse");

    let (status, body) = server.get("/api/projects?status=TERMINE", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 0);

    let (status, body) = server.get("/api/projects?limit=2&page=2", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["projects"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["pagination"]["page"], 2);
}

#[test]
fn manager_assignment_notifies_and_grants_edit() {
    let server = Server::start("project_manager");
    let director = server.bootstrap_director();
    let (consultant, consultant_user, _) =
        server.bootstrap_consultant("brice@atelier.test", 40000.0);

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Portail des adhérents",
            "description": "Espace membre avec paiement des cotisations.",
            "budget": 2000000.0,
            "estimatedHours": 200.0,
            "managerId": consultant_user,
        }),
    );
    assert_eq!(status, 201, "create: {body}");
    assert_eq!(body["manager"]["firstName"], "Brice");
    let project_id = body["id"].as_str().expect("project id").to_string();

    let (status, body) = server.get("/api/notifications", Some(&consultant));
    assert_eq!(status, 200);
    assert_eq!(body["unreadCount"], 1);
    assert_eq!(body["notifications"][0]["title"], "Nouveau projet assigné");
    assert_eq!(
        body["notifications"][0]["message"],
        "Vous avez été assigné comme manager du projet \"Portail des adhérents\""
    );
    assert_eq!(body["notifications"][0]["entityType"], "project");

    // The manager can edit without being the creator.
    let (status, body) = server.put(
        &format!("/api/projects/{project_id}"),
        Some(&consultant),
        json!({ "status": "EN_COURS" }),
    );
    assert_eq!(status, 200, "manager update: {body}");
    assert_eq!(body["status"], "EN_COURS");
}

#[test]
fn budget_change_books_a_ledger_entry() {
    let server = Server::start("project_budget");
    let director = server.bootstrap_director();
    let (consultant, _, _) = server.bootstrap_consultant("brice@atelier.test", 40000.0);

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Boutique en ligne",
            "description": "Catalogue et paiement mobile pour la boutique.",
            "budget": 500000.0,
            "estimatedHours": 60.0,
        }),
    );
    assert_eq!(status, 201);
    let project_id = body["id"].as_str().expect("project id").to_string();

    let (status, body) = server.put(
        &format!("/api/projects/{project_id}/budget"),
        Some(&director),
        json!({ "budget": 800000.0, "reason": "avenant signé" }),
    );
    assert_eq!(status, 200, "budget increase: {body}");
    assert_eq!(body["project"]["budget"], 800000.0);
    assert_eq!(body["transaction"]["type"], "ENTREE");
    assert_eq!(body["transaction"]["category"], "REVENUS_PROJET");
    assert_eq!(body["transaction"]["amount"], 300000.0);
    assert_eq!(
        body["transaction"]["description"],
        "Modification budget projet: Boutique en ligne - avenant signé"
    );

    let (status, body) = server.put(
        &format!("/api/projects/{project_id}/budget"),
        Some(&director),
        json!({ "budget": 700000.0 }),
    );
    assert_eq!(status, 200, "budget decrease: {body}");
    assert_eq!(body["transaction"]["type"], "SORTIE");
    assert_eq!(body["transaction"]["amount"], 100000.0);
    assert_eq!(
        body["transaction"]["description"],
        "Modification budget projet: Boutique en ligne"
    );

    let (status, body) = server.put(
        &format!("/api/projects/{project_id}/budget"),
        Some(&director),
        json!({ "budget": 700000.0 }),
    );
    assert_eq!(status, 200, "unchanged budget: {body}");
    assert!(body["transaction"].is_null());

    let (status, body) = server.put(
        &format!("/api/projects/{project_id}/budget"),
        Some(&consultant),
        json!({ "budget": 1.0 }),
    );
    assert_api_error(
        status,
        &body,
        403,
        "Permissions insuffisantes pour modifier ce projet",
    );
}

#[test]
fn delete_archives_when_tasks_exist() {
    let server = Server::start("project_delete");
    let director = server.bootstrap_director();
    let (consultant, _, _) = server.bootstrap_consultant("brice@atelier.test", 40000.0);

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Prototype jetable",
            "description": "Maquette de démonstration pour le salon.",
            "budget": 100000.0,
            "estimatedHours": 10.0,
        }),
    );
    assert_eq!(status, 201);
    let empty_id = body["id"].as_str().expect("id").to_string();

    let (status, body) = server.delete(&format!("/api/projects/{empty_id}"), Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Projet supprimé avec succès");
    let (status, _) = server.get(&format!("/api/projects/{empty_id}"), Some(&director));
    assert_eq!(status, 404);

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Chantier livré",
            "description": "Projet livré dont l'historique doit rester.",
            "budget": 600000.0,
            "estimatedHours": 50.0,
        }),
    );
    assert_eq!(status, 201);
    let kept_id = body["id"].as_str().expect("id").to_string();
    let (status, _) = server.post(
        &format!("/api/projects/{kept_id}/tasks"),
        Some(&director),
        json!({
            "title": "Lot unique",
            "description": "Travail déjà réalisé.",
            "estimatedHours": 8.0,
        }),
    );
    assert_eq!(status, 201);

    let (status, body) = server.delete(&format!("/api/projects/{kept_id}"), Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Projet archivé avec succès");

    let (status, body) = server.get(&format!("/api/projects/{kept_id}"), Some(&director));
    assert_eq!(status, 200, "archived detail stays readable: {body}");
    assert_eq!(body["isActive"], false);

    let (status, body) = server.get("/api/projects", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 0, "archived projects leave the list");

    let (status, body) = server.delete(&format!("/api/projects/{kept_id}"), Some(&consultant));
    assert_api_error(status, &body, 403, "Permissions insuffisantes");
}

#[test]
fn nested_task_creation_respects_the_budget() {
    let server = Server::start("project_task_budget");
    let director = server.bootstrap_director();

    let (status, body) = server.post(
        "/api/projects",
        Some(&director),
        json!({
            "title": "Enveloppe serrée",
            "description": "Le budget des tâches ne doit jamais dépasser l'enveloppe.",
            "budget": 100000.0,
            "estimatedHours": 30.0,
        }),
    );
    assert_eq!(status, 201);
    let project_id = body["id"].as_str().expect("id").to_string();

    let (status, body) = server.post(
        &format!("/api/projects/{project_id}/tasks"),
        Some(&director),
        json!({
            "title": "Premier lot",
            "description": "Consomme presque tout.",
            "estimatedHours": 10.0,
            "budget": 80000.0,
        }),
    );
    assert_eq!(status, 201, "first task: {body}");
    assert_eq!(body["position"], 0);
    assert!(body["assignee"].is_null());

    let (status, body) = server.post(
        &format!("/api/projects/{project_id}/tasks"),
        Some(&director),
        json!({
            "title": "Second lot",
            "description": "Demande plus que le reste.",
            "estimatedHours": 10.0,
            "budget": 50000.0,
        }),
    );
    assert_api_error(status, &body, 400, "Budget insuffisant pour cette tâche");
    assert_eq!(body["error"]["recovery"], "Budget restant: 20 000 FCFA");

    let (status, body) = server.get(&format!("/api/projects/{project_id}"), Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["budgetUsed"], 80000.0);

    let (status, body) = server.get(&format!("/api/projects/{project_id}/tasks"), Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["title"], "Premier lot");

    let (status, body) = server.post(
        "/api/projects/PRJ-404/tasks",
        Some(&director),
        json!({
            "title": "Nulle part",
            "description": "Le projet n'existe pas.",
            "estimatedHours": 5.0,
        }),
    );
    assert_api_error(status, &body, 404, "Projet non trouvé");
}

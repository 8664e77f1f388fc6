#![forbid(unsafe_code)]

mod support;

use serde_json::json;
use support::{SEED_PASSWORD, Server, assert_api_error};

fn create_project(server: &Server, token: &str, title: &str) -> String {
    let (status, body) = server.post(
        "/api/projects",
        Some(token),
        json!({
            "title": title,
            "description": "Prestation facturée au forfait pour le client.",
            "budget": 2000000.0,
            "estimatedHours": 100.0,
        }),
    );
    assert_eq!(status, 201, "project: {body}");
    body["id"].as_str().expect("project id").to_string()
}

#[test]
fn director_books_and_settles() {
    let server = Server::start("transaction_settle");
    let director = server.bootstrap_director();
    let project_id = create_project(&server, &director, "Refonte du portail client");

    let (status, body) = server.post(
        "/api/transactions",
        Some(&director),
        json!({
            "type": "ENTREE",
            "category": "REVENUS_PROJET",
            "amount": 1500000.0,
            "description": "Acompte de démarrage du portail",
            "projectId": project_id,
            "reference": "FAC-2026-001",
        }),
    );
    assert_eq!(status, 201, "create: {body}");
    assert_eq!(body["id"], "TRX-001");
    assert_eq!(body["type"], "ENTREE");
    assert_eq!(body["category"], "REVENUS_PROJET");
    assert_eq!(body["amount"], 1500000.0);
    assert_eq!(body["isPaid"], false);
    assert_eq!(body["reference"], "FAC-2026-001");
    assert_eq!(body["project"]["title"], "Refonte du portail client");
    assert!(body["consultant"].is_null());

    let (status, body) = server.put("/api/transactions/TRX-001/pay", Some(&director), json!({}));
    assert_eq!(status, 200, "pay: {body}");
    assert_eq!(body["message"], "Transaction marquée comme payée");
    assert_eq!(body["transaction"]["isPaid"], true);

    let (status, body) = server.put("/api/transactions/TRX-001/pay", Some(&director), json!({}));
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Transaction déjà payée");

    let (status, body) = server.put("/api/transactions/TRX-404/pay", Some(&director), json!({}));
    assert_api_error(status, &body, 404, "Transaction non trouvée");
}

#[test]
fn create_validations() {
    let server = Server::start("transaction_bad_input");
    let director = server.bootstrap_director();
    let (consultant, _, _) = server.bootstrap_consultant("brice@atelier.test", 40000.0);

    let base = json!({
        "type": "SORTIE",
        "category": "FRAIS_MATERIELS",
        "amount": 50000.0,
        "description": "Achat de licences annuelles",
    });

    let mut bad_type = base.clone();
    bad_type["type"] = json!("VIREMENT");
    let (status, body) = server.post("/api/transactions", Some(&director), bad_type);
    assert_api_error(status, &body, 400, "Type de transaction invalide");

    let mut bad_category = base.clone();
    bad_category["category"] = json!("CADEAUX");
    let (status, body) = server.post("/api/transactions", Some(&director), bad_category);
    assert_api_error(status, &body, 400, "Catégorie invalide");

    let mut zero_amount = base.clone();
    zero_amount["amount"] = json!(0.0);
    let (status, body) = server.post("/api/transactions", Some(&director), zero_amount);
    assert_api_error(status, &body, 400, "Le montant doit être supérieur à 0");

    let mut short_description = base.clone();
    short_description["description"] = json!("Truc");
    let (status, body) = server.post("/api/transactions", Some(&director), short_description);
    assert_api_error(status, &body, 400, "La description doit contenir au moins 5 caractères");

    let mut ghost_project = base.clone();
    ghost_project["projectId"] = json!("PRJ-404");
    let (status, body) = server.post("/api/transactions", Some(&director), ghost_project);
    assert_api_error(status, &body, 404, "Projet non trouvé");

    let mut ghost_consultant = base.clone();
    ghost_consultant["consultantId"] = json!("CON-404");
    let (status, body) = server.post("/api/transactions", Some(&director), ghost_consultant);
    assert_api_error(status, &body, 404, "Consultant non trouvé");

    // The whole ledger surface is director-only.
    let (status, body) = server.post("/api/transactions", Some(&consultant), base);
    assert_api_error(status, &body, 403, "Permissions insuffisantes");
    let (status, body) = server.get("/api/transactions", Some(&consultant));
    assert_api_error(status, &body, 403, "Permissions insuffisantes");
    let (status, body) = server.get("/api/transactions/stats", Some(&consultant));
    assert_api_error(status, &body, 403, "Permissions insuffisantes");
    let (status, body) = server.put("/api/transactions/TRX-001/pay", Some(&consultant), json!({}));
    assert_api_error(status, &body, 403, "Permissions insuffisantes");
}

#[test]
fn salary_booking_notifies_consultant() {
    let server = Server::start("transaction_salary_notice");
    let director = server.bootstrap_director();
    let (consultant, _, consultant_id) = server.bootstrap_consultant("brice@atelier.test", 40000.0);

    let (status, body) = server.post(
        "/api/transactions",
        Some(&director),
        json!({
            "type": "SORTIE",
            "category": "SALAIRE_CONSULTANT",
            "amount": 75000.0,
            "description": "Prime de fin de mission",
            "consultantId": consultant_id,
        }),
    );
    assert_eq!(status, 201, "salary: {body}");
    assert_eq!(body["consultant"]["id"], consultant_id);
    assert_eq!(body["consultant"]["name"], "Brice Moukoko");
    let transaction_id = body["id"].as_str().expect("transaction id").to_string();

    let (status, body) = server.get("/api/notifications", Some(&consultant));
    assert_eq!(status, 200);
    assert_eq!(body["unreadCount"], 1);
    let notification = &body["notifications"][0];
    assert_eq!(notification["type"], "PAIEMENT");
    assert_eq!(notification["title"], "Nouvelle transaction");
    assert_eq!(
        notification["message"],
        "Une transaction de 75 000 FCFA a été créée: Prime de fin de mission"
    );
    assert_eq!(notification["entityType"], "transaction");
    assert_eq!(notification["entityId"], transaction_id);
}

#[test]
fn consultant_payment_releases_completed_work() {
    let server = Server::start("transaction_payout");
    let director = server.bootstrap_director();
    let (consultant, consultant_user, consultant_id) =
        server.bootstrap_consultant("brice@atelier.test", 0.0);
    let project_id = create_project(&server, &director, "Assistance à maîtrise d'ouvrage");

    let mut task_ids: Vec<String> = Vec::new();
    for title in ["Lot cadrage", "Lot recette"] {
        let (status, body) = server.post(
            &format!("/api/projects/{project_id}/tasks"),
            Some(&director),
            json!({
                "title": title,
                "description": "Lot forfaitaire de la mission.",
                "estimatedHours": 8.0,
                "assignedUserId": consultant_user,
            }),
        );
        assert_eq!(status, 201, "task: {body}");
        task_ids.push(body["id"].as_str().expect("task id").to_string());
    }
    for task_id in &task_ids {
        let (status, _) = server.put(
            &format!("/api/tasks/{task_id}/status"),
            Some(&consultant),
            json!({ "status": "TERMINE", "actualHours": 8.0 }),
        );
        assert_eq!(status, 200);
    }

    let (status, body) = server.post(
        "/api/transactions/consultant-payment",
        Some(&director),
        json!({
            "consultantId": consultant_id,
            "amount": 160000.0,
            "description": "Règlement des lots terminés",
            "taskIds": task_ids,
        }),
    );
    assert_eq!(status, 201, "payout: {body}");
    assert_eq!(body["message"], "Paiement créé avec succès");
    assert_eq!(body["transaction"]["type"], "SORTIE");
    assert_eq!(body["transaction"]["category"], "SALAIRE_CONSULTANT");
    assert_eq!(body["transaction"]["amount"], 160000.0);
    assert_eq!(body["transaction"]["isPaid"], false);
    assert_eq!(body["consultant"]["id"], consultant_id);
    assert_eq!(body["consultant"]["name"], "Brice Moukoko");
    assert_eq!(body["consultant"]["email"], "brice@atelier.test");
    let tasks = body["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["project"], "Assistance à maîtrise d'ouvrage");
    assert_eq!(tasks[0]["actualHours"], 8.0);

    let (status, body) = server.get("/api/notifications", Some(&consultant));
    assert_eq!(status, 200);
    let titles: Vec<&str> = body["notifications"]
        .as_array()
        .expect("notifications")
        .iter()
        .filter_map(|n| n["title"].as_str())
        .collect();
    assert!(
        titles.contains(&"Nouveau paiement programmé"),
        "missing payout notice: {titles:?}"
    );

    // A task that is not finished cannot back a payout.
    let (status, body) = server.post(
        &format!("/api/projects/{project_id}/tasks"),
        Some(&director),
        json!({
            "title": "Lot en attente",
            "description": "Lot encore à démarrer.",
            "estimatedHours": 4.0,
            "assignedUserId": consultant_user,
        }),
    );
    assert_eq!(status, 201);
    let pending_task = body["id"].as_str().expect("task id").to_string();
    let (status, body) = server.post(
        "/api/transactions/consultant-payment",
        Some(&director),
        json!({
            "consultantId": consultant_id,
            "amount": 10000.0,
            "description": "Règlement anticipé",
            "taskIds": [pending_task],
        }),
    );
    assert_api_error(
        status,
        &body,
        400,
        "Certaines tâches ne sont pas valides ou ne sont pas terminées",
    );

    let (status, body) = server.post(
        "/api/transactions/consultant-payment",
        Some(&director),
        json!({
            "consultantId": consultant_id,
            "amount": 0.0,
            "description": "Règlement nul",
        }),
    );
    assert_api_error(status, &body, 400, "Le montant doit être positif");

    let (status, body) = server.post(
        "/api/transactions/consultant-payment",
        Some(&director),
        json!({
            "consultantId": "CON-404",
            "amount": 10000.0,
            "description": "Règlement fantôme",
        }),
    );
    assert_api_error(status, &body, 404, "Consultant non trouvé");
}

#[test]
fn list_filters_and_summary() {
    let server = Server::start("transaction_list");
    let director = server.bootstrap_director();

    for payload in [
        json!({
            "type": "ENTREE",
            "category": "REVENUS_PROJET",
            "amount": 1000000.0,
            "description": "Facture réglée par le client",
            "isPaid": true,
        }),
        json!({
            "type": "SORTIE",
            "category": "FRAIS_MATERIELS",
            "amount": 400000.0,
            "description": "Commande de postes de travail",
        }),
        json!({
            "type": "SORTIE",
            "category": "FRAIS_DEPLACEMENT",
            "amount": 100000.0,
            "description": "Mission terrain à Bafoussam",
            "isPaid": true,
        }),
    ] {
        let (status, body) = server.post("/api/transactions", Some(&director), payload);
        assert_eq!(status, 201, "seed entry: {body}");
    }

    let (status, body) = server.get("/api/transactions", Some(&director));
    assert_eq!(status, 200, "list: {body}");
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["transactions"][0]["id"], "TRX-003", "newest first");
    assert_eq!(body["summary"]["totalTransactions"], 3);
    assert_eq!(body["summary"]["totalAmount"], 1500000.0);
    assert_eq!(body["summary"]["totalEntrees"], 1000000.0);
    assert_eq!(body["summary"]["totalSorties"], 500000.0);
    assert_eq!(body["summary"]["balance"], 500000.0);

    // The type filter narrows the rows but both running totals stay put.
    let (status, body) = server.get("/api/transactions?type=ENTREE", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["summary"]["totalTransactions"], 1);
    assert_eq!(body["summary"]["totalAmount"], 1000000.0);
    assert_eq!(body["summary"]["totalEntrees"], 1000000.0);
    assert_eq!(body["summary"]["totalSorties"], 500000.0);

    let (status, body) = server.get("/api/transactions?isPaid=false", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["transactions"][0]["id"], "TRX-002");

    let (status, body) = server.get(
        "/api/transactions?category=FRAIS_DEPLACEMENT",
        Some(&director),
    );
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = server.get("/api/transactions?startDate=hier", Some(&director));
    assert_api_error(status, &body, 400, "Date de début invalide");
    let (status, body) = server.get("/api/transactions?endDate=demain", Some(&director));
    assert_api_error(status, &body, 400, "Date de fin invalide");
}

#[test]
fn seeded_stats_cover_ledger() {
    let server = Server::start_seeded("transaction_stats");
    let director = server.login(support::DIRECTOR_EMAIL, SEED_PASSWORD);

    let (status, body) = server.get("/api/transactions/stats?period=all", Some(&director));
    assert_eq!(status, 200, "stats: {body}");
    assert_eq!(body["period"], "all");
    assert!(body["generatedAt"].as_str().is_some());
    assert_eq!(body["summary"]["total"]["count"], 241);
    assert_eq!(body["summary"]["total"]["amount"], 218808000.0);
    assert_eq!(body["summary"]["entrees"]["count"], 121);
    assert_eq!(body["summary"]["entrees"]["amount"], 151100000.0);
    assert_eq!(body["summary"]["sorties"]["count"], 120);
    assert_eq!(body["summary"]["sorties"]["amount"], 67708000.0);
    assert_eq!(body["summary"]["balance"], 83392000.0);

    let categories = body["categoryBreakdown"].as_array().expect("categories");
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0]["category"], "FRAIS_DEPLACEMENT");
    assert_eq!(categories[0]["type"], "SORTIE");
    assert_eq!(categories[0]["count"], 40);
    assert_eq!(categories[2]["category"], "REVENUS_PROJET");
    assert_eq!(categories[2]["count"], 121);

    // Client revenue only ever lands on half the catalogue.
    let projects = body["topProjects"].as_array().expect("top projects");
    assert_eq!(projects.len(), 5);
    let consultants = body["topConsultants"].as_array().expect("top consultants");
    assert_eq!(consultants.len(), 10);
    for window in [&projects, &consultants] {
        let amounts: Vec<f64> = window
            .iter()
            .filter_map(|row| row["amount"].as_f64())
            .collect();
        assert_eq!(amounts.len(), window.len());
        assert!(
            amounts.windows(2).all(|pair| pair[0] >= pair[1]),
            "ranking must be descending: {amounts:?}"
        );
    }
    assert!(projects[0]["project"].as_str().is_some());
    assert!(consultants[0]["consultant"].as_str().is_some());

    let timeline = body["timeline"].as_array().expect("timeline");
    assert_eq!(timeline.len(), 12);
    for bucket in timeline {
        let entrees = bucket["entrees"].as_f64().expect("entrees");
        let sorties = bucket["sorties"].as_f64().expect("sorties");
        let balance = bucket["balance"].as_f64().expect("balance");
        assert!((balance - (entrees - sorties)).abs() < 1e-6);
        assert!(bucket["period"].as_str().is_some());
    }

    let (status, body) = server.get(
        "/api/transactions/stats?period=3m&groupBy=week",
        Some(&director),
    );
    assert_eq!(status, 200);
    assert_eq!(body["timeline"].as_array().map(Vec::len), Some(12));
    assert_eq!(body["period"], "3m");

    let (status, body) = server.get("/api/transactions/stats", Some(&director));
    assert_eq!(status, 200);
    assert_eq!(body["period"], "12m");

    // A fixed June window of the seeded ledger through the list filters.
    let (status, body) = server.get(
        "/api/transactions?startDate=2025-06-01&endDate=2025-07-01",
        Some(&director),
    );
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 90);
}

#![forbid(unsafe_code)]

//! Deterministic demo dataset: one director, fifteen consultants, ten
//! projects with task boards and a daily ledger from June through
//! mid-August 2025. Reseeding wipes and rebuilds the same rows.

use super::*;
use om_core::status::{PRIORITIES, PROJECT_STATUSES, TASK_STATUSES};
use rusqlite::{Transaction, params};

pub const DIRECTOR_EMAIL: &str = "directeur@optimum.com";

const FIRST_NAMES: [&str; 15] = [
    "Yvan", "Marthe", "Serge", "Carine", "Didier", "Josiane", "Alain", "Solange", "Hervé",
    "Nadège", "Samuel", "Gaëlle", "Roger", "Chantal", "Rigobert",
];
const LAST_NAMES: [&str; 15] = [
    "Ngassa", "Kamdem", "Tchinda", "Fogue", "Mbiaga", "Wembe", "Talla", "Fotso", "Kenfack",
    "Noubissi", "Toko", "Eto'o", "Milla", "N'Kono", "Song",
];
const SKILLS: [&str; 9] = [
    "React",
    "Node.js",
    "Gestion de Projet",
    "Design UX/UI",
    "DevOps",
    "Base de données",
    "Marketing Digital",
    "PHP/Symfony",
    "Flutter",
];
const SPECIALIZATIONS: [&str; 8] = [
    "Développeur Full-Stack",
    "Chef de Projet Digital",
    "Designer UX/UI",
    "Ingénieur DevOps",
    "Administrateur Base de données",
    "Consultant Marketing Digital",
    "Développeur Mobile",
    "Architecte Logiciel",
];
const CITIES: [&str; 7] = [
    "Douala",
    "Yaoundé",
    "Bafoussam",
    "Limbe",
    "Kribi",
    "Garoua",
    "Bamenda",
];

const PROJECTS: [(&str, f64, f64, &str); 10] = [
    (
        "Création de logo pour la boutique 'Douala Market'",
        350_000.0,
        40.0,
        "Douala Market",
    ),
    (
        "Développement d'une page vitrine pour 'Kribi Pêcheurs'",
        750_000.0,
        80.0,
        "Kribi Pêcheurs",
    ),
    (
        "Campagne publicitaire pour 'Yaoundé Fashion Week'",
        500_000.0,
        50.0,
        "Yaoundé Fashion Week",
    ),
    (
        "Maintenance du site de l'hôtel 'Limbe Beach Resort'",
        400_000.0,
        30.0,
        "Limbe Beach Resort",
    ),
    (
        "Rédaction de contenu pour le blog 'Cuisine du Mboa'",
        250_000.0,
        25.0,
        "Cuisine du Mboa",
    ),
    (
        "Développement de l'app de gestion de tontine 'TontinApp'",
        8_500_000.0,
        600.0,
        "TontinApp SARL",
    ),
    (
        "Plateforme e-commerce pour 'Made in Cameroun'",
        12_000_000.0,
        950.0,
        "Made in Cameroun",
    ),
    (
        "Système de billetterie en ligne pour la fédération de football",
        15_000_000.0,
        1_200.0,
        "Fédération Camerounaise de Football",
    ),
    (
        "Digitalisation des archives de la Mairie de Bafoussam",
        7_000_000.0,
        550.0,
        "Mairie de Bafoussam",
    ),
    (
        "Création d'une application de VTC pour la ville de Douala",
        25_000_000.0,
        2_000.0,
        "Douala VTC Express",
    ),
];

const TASK_TITLES: [&str; 12] = [
    "Maquettes haute fidélité",
    "Mise en place du dépôt",
    "Intégration des écrans principaux",
    "Tests utilisateurs",
    "Déploiement en préproduction",
    "Configuration du pipeline CI",
    "Modélisation des données",
    "Rédaction du cahier de recette",
    "Optimisation des requêtes",
    "Revue de sécurité",
    "Formation des équipes",
    "Documentation technique",
];
const PURCHASES: [&str; 6] = [
    "ordinateur portable",
    "licences logicielles",
    "matériel réseau",
    "fournitures de bureau",
    "abonnement cloud",
    "serveur de sauvegarde",
];

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;
// 2025-02-01T00:00:00Z
const USERS_BASE_MS: i64 = 1_738_368_000_000;
// 2025-03-01T00:00:00Z
const PROJECTS_BASE_MS: i64 = 1_740_787_200_000;
// 2025-06-01T00:00:00Z, first day of the seeded ledger
const LEDGER_BASE_MS: i64 = 1_748_736_000_000;
// 2025-06-01 through 2025-08-20 inclusive
const LEDGER_DAYS: i64 = 81;

impl SqliteStore {
    /// Wipes every table and rebuilds the demo dataset. All seeded
    /// accounts share `password_hash`.
    pub fn seed_demo(&mut self, password_hash: &str) -> Result<SeedSummary, StoreError> {
        let mut summary = SeedSummary::default();
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            r#"
            DELETE FROM notifications;
            DELETE FROM transactions;
            DELETE FROM tasks;
            DELETE FROM projects;
            DELETE FROM consultants;
            DELETE FROM sessions;
            DELETE FROM users;
            DELETE FROM counters;
            "#,
        )?;

        let director_id = insert_seed_user(
            &tx,
            "Jean-Pierre",
            "Kamga",
            DIRECTOR_EMAIL,
            password_hash,
            "DIRECTEUR",
            USERS_BASE_MS,
        )?;
        summary.users += 1;

        // (user_id, consultant_id, tjm)
        let mut consultants: Vec<(String, String, f64)> = Vec::with_capacity(15);
        for i in 0..15 {
            let first = FIRST_NAMES[i];
            let last = LAST_NAMES[i];
            let email = format!("{}.{}@optimum-consulting.cm", fold_ascii(first), fold_ascii(last));
            let created_ms = USERS_BASE_MS + (i as i64 + 1) * HOUR_MS;
            let user_id =
                insert_seed_user(&tx, first, last, &email, password_hash, "CONSULTANT", created_ms)?;
            summary.users += 1;

            let tjm = 35_000.0 + i as f64 * 8_000.0;
            let specialization = SPECIALIZATIONS[i % SPECIALIZATIONS.len()];
            let city = CITIES[i % CITIES.len()];
            let skill_count = 2 + i % 3;
            let skills: Vec<String> = (0..skill_count)
                .map(|k| SKILLS[(i * 2 + k) % SKILLS.len()].to_string())
                .collect();
            let biography = format!(
                "{specialization} basé à {city}, {} ans d'expérience sur des missions de conseil.",
                1 + i % 15
            );

            let consultant_id = next_id_tx(&tx, "consultant", "CON")?;
            tx.execute(
                r#"
                INSERT INTO consultants(id, user_id, tjm, specialization, skills, experience_years, biography, is_available, reliability, created_ms, updated_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 100, ?8, ?8)
                "#,
                params![
                    consultant_id,
                    user_id,
                    tjm,
                    specialization,
                    encode_skills(&skills),
                    (1 + i % 15) as i64,
                    biography,
                    created_ms
                ],
            )?;
            summary.consultants += 1;
            consultants.push((user_id, consultant_id, tjm));
        }

        let mut project_rows: Vec<(String, String)> = Vec::with_capacity(PROJECTS.len());
        for (i, (title, budget, estimated_hours, client)) in PROJECTS.iter().enumerate() {
            let created_ms = PROJECTS_BASE_MS + i as i64 * 9 * DAY_MS + 10 * HOUR_MS;
            let manager = &consultants[(i * 3) % consultants.len()];
            let project_id = next_id_tx(&tx, "project", "PRJ")?;
            tx.execute(
                r#"
                INSERT INTO projects(id, title, description, status, priority, budget, budget_used,
                                     estimated_hours, actual_hours, start_ms, end_ms, deadline_ms,
                                     client_name, client_email, client_phone, creator_id, manager_id,
                                     is_active, created_ms, updated_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, 0, ?8, NULL, ?9, ?10, NULL, NULL, ?11, ?12, 1, ?13, ?13)
                "#,
                params![
                    project_id,
                    title,
                    format!("Prestation pour {client}: cadrage, réalisation et suivi."),
                    PROJECT_STATUSES[i % PROJECT_STATUSES.len()],
                    PRIORITIES[i % PRIORITIES.len()],
                    budget,
                    estimated_hours,
                    created_ms,
                    created_ms + 90 * DAY_MS,
                    client,
                    director_id,
                    manager.0,
                    created_ms
                ],
            )?;
            summary.projects += 1;

            let task_count = 5 + i % 4;
            let mut actual_total = 0.0;
            for j in 0..task_count {
                let task_created_ms = created_ms + (j as i64 + 1) * 2 * DAY_MS + j as i64 * HOUR_MS;
                let status = TASK_STATUSES[(i + j) % TASK_STATUSES.len()];
                let estimated = 5.0 + ((j * 7) % 36) as f64;
                let assignee = &consultants[(i * 5 + j) % consultants.len()];

                let (start_ms, end_ms, actual_hours) = match status {
                    "EN_COURS" => (Some(task_created_ms + DAY_MS), None, None),
                    "TERMINE" => {
                        let start = task_created_ms + DAY_MS;
                        let end = start + (3 + j as i64 % 7) * DAY_MS;
                        let factor = [0.8, 1.0, 1.3][j % 3];
                        (Some(start), Some(end), Some(estimated * factor))
                    }
                    _ => (None, None, None),
                };
                actual_total += actual_hours.unwrap_or(0.0);

                let task_id = next_id_tx(&tx, "task", "TSK")?;
                tx.execute(
                    r#"
                    INSERT INTO tasks(id, project_id, title, description, status, priority, budget,
                                      estimated_hours, actual_hours, assigned_user_id, parent_task_id,
                                      position, start_ms, end_ms, deadline_ms, created_ms, updated_ms)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, NULL, ?10, ?11, ?12, ?13, ?14, ?14)
                    "#,
                    params![
                        task_id,
                        project_id,
                        TASK_TITLES[(i * 4 + j) % TASK_TITLES.len()],
                        format!("Lot {} du projet, à livrer avec recette.", j + 1),
                        status,
                        PRIORITIES[(i * 2 + j) % PRIORITIES.len()],
                        estimated,
                        actual_hours,
                        assignee.0,
                        j as i64,
                        start_ms,
                        end_ms,
                        task_created_ms + 21 * DAY_MS,
                        task_created_ms
                    ],
                )?;
                summary.tasks += 1;
            }

            if actual_total > 0.0 {
                tx.execute(
                    "UPDATE projects SET actual_hours = ?2 WHERE id = ?1",
                    params![project_id, actual_total],
                )?;
            }
            project_rows.push((project_id, title.to_string()));
        }

        for day in 0..LEDGER_DAYS {
            let count = 1 + (day * 3) % 5;
            for k in 0..count {
                let created_ms = LEDGER_BASE_MS + day * DAY_MS + (8 + k * 2) * HOUR_MS;
                let id = next_id_tx(&tx, "transaction", "TRX")?;
                if (day + k) % 2 == 0 {
                    let project = &project_rows[((day * 13 + k * 7) % project_rows.len() as i64) as usize];
                    let amount = 100_000.0 + ((day * 13 + k * 7) % 25) as f64 * 100_000.0;
                    tx.execute(
                        r#"
                        INSERT INTO transactions(id, type, category, amount, description, reference, project_id, consultant_id, is_paid, due_ms, created_ms)
                        VALUES (?1, 'ENTREE', 'REVENUS_PROJET', ?2, ?3, NULL, ?4, NULL, 1, NULL, ?5)
                        "#,
                        params![
                            id,
                            amount,
                            format!("Paiement client pour projet \"{}\"", project.1),
                            project.0,
                            created_ms
                        ],
                    )?;
                } else {
                    match (day + k) % 3 {
                        0 => {
                            let consultant =
                                &consultants[((day + k * 5) % consultants.len() as i64) as usize];
                            let amount = consultant.2 * (5 + (day + k) % 16) as f64;
                            tx.execute(
                                r#"
                                INSERT INTO transactions(id, type, category, amount, description, reference, project_id, consultant_id, is_paid, due_ms, created_ms)
                                VALUES (?1, 'SORTIE', 'SALAIRE_CONSULTANT', ?2, ?3, NULL, NULL, ?4, 1, NULL, ?5)
                                "#,
                                params![
                                    id,
                                    amount,
                                    format!("Paiement salaire pour consultant {}", consultant.1),
                                    consultant.1,
                                    created_ms
                                ],
                            )?;
                        }
                        rest => {
                            let category = if rest == 1 {
                                "FRAIS_DEPLACEMENT"
                            } else {
                                "FRAIS_MATERIELS"
                            };
                            let amount = 25_000.0 + ((day * 11 + k * 5) % 20) as f64 * 25_000.0;
                            let item = PURCHASES[((day + k) % PURCHASES.len() as i64) as usize];
                            tx.execute(
                                r#"
                                INSERT INTO transactions(id, type, category, amount, description, reference, project_id, consultant_id, is_paid, due_ms, created_ms)
                                VALUES (?1, 'SORTIE', ?2, ?3, ?4, NULL, NULL, NULL, 1, NULL, ?5)
                                "#,
                                params![id, category, amount, format!("Achat: {item}"), created_ms],
                            )?;
                        }
                    }
                }
                summary.transactions += 1;
            }
        }

        tx.commit()?;
        Ok(summary)
    }
}

fn insert_seed_user(
    tx: &Transaction<'_>,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
    created_ms: i64,
) -> Result<String, StoreError> {
    let id = next_id_tx(tx, "user", "USR")?;
    tx.execute(
        r#"
        INSERT INTO users(id, email, password_hash, first_name, last_name, phone, role, is_active, created_ms, updated_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, 1, ?7, ?7)
        "#,
        params![id, email, password_hash, first_name, last_name, role, created_ms],
    )?;
    Ok(id)
}

/// Lowercases and strips accents and apostrophes so seeded names form
/// plain ASCII mailbox parts.
fn fold_ascii(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'à' | 'â' => Some('a'),
            'î' | 'ï' => Some('i'),
            'ô' => Some('o'),
            'ù' | 'û' | 'ü' => Some('u'),
            'ç' => Some('c'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

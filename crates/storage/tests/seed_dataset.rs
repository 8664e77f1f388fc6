use om_storage::{DIRECTOR_EMAIL, SqliteStore, TransactionFilter};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("om_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn demo_dataset_has_the_published_shape() {
    let dir = temp_dir("demo_dataset_has_the_published_shape");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let summary = store.seed_demo("salt$digest").expect("seed");
    assert_eq!(summary.users, 16);
    assert_eq!(summary.consultants, 15);
    assert_eq!(summary.projects, 10);
    assert_eq!(summary.tasks, 63);
    assert_eq!(summary.transactions, 241);

    let director = store
        .user_by_email(DIRECTOR_EMAIL)
        .expect("query")
        .expect("director seeded");
    assert_eq!(director.role, "DIRECTEUR");
    assert_eq!(director.first_name, "Jean-Pierre");
    assert_eq!(director.password_hash, "salt$digest");

    // Accented and apostrophed names fold into plain mailbox parts.
    let consultant = store
        .user_by_email("gaelle.etoo@optimum-consulting.cm")
        .expect("query")
        .expect("folded email resolves");
    assert_eq!(consultant.first_name, "Gaëlle");
    assert_eq!(consultant.last_name, "Eto'o");

    let counters = store.dashboard_counters().expect("counters");
    assert_eq!(counters.projects, 10);
    assert_eq!(counters.tasks, 63);
    assert_eq!(counters.consultants, 15);

    let ledger = store
        .transaction_summary(&TransactionFilter::default())
        .expect("ledger summary");
    assert_eq!(ledger.total_transactions, 241);
    assert_eq!(
        ledger.entrees_count + ledger.sorties_count,
        241,
        "every entry sits on one side"
    );
    assert!(ledger.total_entrees > 0.0);
    assert!(ledger.total_sorties > 0.0);
}

#[test]
fn reseeding_wipes_and_rebuilds_identically() {
    let dir = temp_dir("reseeding_wipes_and_rebuilds_identically");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let first = store.seed_demo("salt$digest").expect("first seed");
    let first_director = store
        .user_by_email(DIRECTOR_EMAIL)
        .expect("query")
        .expect("present");

    // A stray account in between must not survive nor shift the ids.
    store
        .create_user(om_storage::NewUser {
            email: "stray@om.cm".to_string(),
            password_hash: "salt$digest".to_string(),
            first_name: "Stray".to_string(),
            last_name: "Row".to_string(),
            phone: None,
            role: "CONSULTANT".to_string(),
        })
        .expect("stray user");

    let second = store.seed_demo("salt$digest").expect("second seed");
    assert_eq!(first.users, second.users);
    assert_eq!(first.transactions, second.transactions);

    assert!(
        store.user_by_email("stray@om.cm").expect("query").is_none(),
        "reseed wipes manual rows"
    );
    let second_director = store
        .user_by_email(DIRECTOR_EMAIL)
        .expect("query")
        .expect("present");
    assert_eq!(first_director.id, second_director.id, "counters restart");

    let (consultants, total) = store
        .list_consultants(&om_storage::ConsultantFilter {
            search: None,
            skill: None,
            available: None,
            sort_by: om_storage::ConsultantSort::Name,
            sort_desc: false,
            limit: 50,
            offset: 0,
        })
        .expect("list");
    assert_eq!(total, 15);
    assert!(consultants.iter().all(|c| c.id.starts_with("CON-")));
}

//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rusqlite::params;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 7, 7];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_tx(day: NaiveDate, kind: TransactionKind, category: Category, amount: i64) -> NewTransaction {
        NewTransaction {
            date: day,
            kind,
            category,
            amount,
            note: None,
            receipt: None,
        }
    }

    /// alice with a small spread of income and expenses over two years
    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        db.create_user("alice", "hash", "alice").unwrap();
        db.create_user("bob", "hash", "bob").unwrap();

        let rows = [
            (date(2023, 12, 30), TransactionKind::Income, Category::Profit, 500_000, 50_000),
            (date(2024, 1, 5), TransactionKind::Income, Category::Profit, 1_000_000, 100_000),
            (date(2024, 1, 5), TransactionKind::Expense, Category::Electricity, 200_000, 0),
            (date(2024, 1, 20), TransactionKind::Expense, Category::Rent, 1_500_000, 0),
            (date(2024, 3, 2), TransactionKind::Income, Category::Profit, 2_000_000, 200_000),
            (date(2024, 3, 2), TransactionKind::Expense, Category::RawMaterials, 300_000, 0),
        ];
        for (day, kind, category, amount, fund) in rows {
            db.insert_transaction("alice", &new_tx(day, kind, category, amount), fund)
                .unwrap();
        }
        db.insert_transaction(
            "bob",
            &new_tx(date(2024, 1, 5), TransactionKind::Income, Category::Profit, 9_999),
            0,
        )
        .unwrap();
        db
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
        assert!(db.path().contains("xpense_test_"));
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name IN ('username', 'password_hash', 'display_name', 'emergency_rate', 'profile_picture', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 6, "users table should have 6 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('id', 'username', 'date', 'kind', 'category', 'amount', 'emergency_fund', 'note', 'receipt_image', 'receipt_hash')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 10, "transactions table should have 10 expected columns");
    }

    #[test]
    fn test_foreign_keys_enabled_on_every_connection() {
        let db = Database::in_memory().unwrap();
        // hold one connection so the next comes from a fresh init
        let _first = db.conn().unwrap();
        let second = db.conn().unwrap();
        let enabled: i64 = second
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);

        let orphan = second.execute(
            "INSERT INTO transactions (username, date, kind, category, amount) VALUES ('ghost', '2024-01-01', 'income', 'profit', 1)",
            [],
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xpense.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new_unencrypted(path).unwrap();
            db.create_user("alice", "hash", "Alice").unwrap();
        }

        let db = Database::new_unencrypted(path).unwrap();
        let user = db.get_user("alice").unwrap().unwrap();
        assert_eq!(user.display_name, "Alice");
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice", "hash1", "alice").unwrap();
        assert_eq!(user.emergency_rate, 10);
        assert!(!user.has_profile_picture);

        assert!(matches!(
            db.create_user("alice", "hash2", "again"),
            Err(Error::Conflict(_))
        ));

        db.set_password_hash("alice", "hash2").unwrap();
        assert_eq!(db.get_password_hash("alice").unwrap().as_deref(), Some("hash2"));

        db.set_display_name("alice", "Warung Alice").unwrap();
        db.set_emergency_rate("alice", 6).unwrap();
        let user = db.get_user("alice").unwrap().unwrap();
        assert_eq!(user.display_name, "Warung Alice");
        assert_eq!(user.emergency_rate, 6);

        assert!(db.get_user("nobody").unwrap().is_none());
        assert!(db.get_password_hash("nobody").unwrap().is_none());
        assert!(matches!(
            db.set_display_name("nobody", "x"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_profile_picture_roundtrip() {
        let db = Database::in_memory().unwrap();
        db.create_user("alice", "hash", "alice").unwrap();
        assert!(db.get_profile_picture("alice").unwrap().is_none());

        db.set_profile_picture("alice", Some(PNG)).unwrap();
        assert_eq!(db.get_profile_picture("alice").unwrap().unwrap(), PNG);
        assert!(db.get_user("alice").unwrap().unwrap().has_profile_picture);

        db.set_profile_picture("alice", None).unwrap();
        assert!(db.get_profile_picture("alice").unwrap().is_none());
    }

    #[test]
    fn test_rename_cascades_to_transactions() {
        let db = seeded();
        db.rename_user("alice", "alicia").unwrap();

        assert!(db.get_user("alice").unwrap().is_none());
        let all = db
            .list_transactions("alicia", &TransactionFilter::default())
            .unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|t| t.username == "alicia"));
        assert!(db
            .list_transactions("alice", &TransactionFilter::default())
            .unwrap()
            .is_empty());

        assert!(matches!(
            db.rename_user("alicia", "bob"),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            db.rename_user("nobody", "someone"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_user_cascades() {
        let db = seeded();
        db.delete_user("alice").unwrap();

        let conn = db.conn().unwrap();
        let remaining: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE username = ?",
                params!["alice"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, 0);

        // bob untouched
        assert_eq!(
            db.count_transactions("bob", &TransactionFilter::default())
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_audit_trail_follows_rename_and_delete() {
        let db = seeded();
        db.log_audit("alice", "create", Some("transaction"), Some(1), Some("income profit 500000"))
            .unwrap();
        db.log_audit("bob", "login", Some("session"), None, None).unwrap();

        db.rename_user("alice", "alicia").unwrap();
        assert!(db.list_audit_log(Some("alice"), 10).unwrap().is_empty());
        let moved = db.list_audit_log(Some("alicia"), 10).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].action, "create");

        db.delete_user("alicia").unwrap();
        assert!(db.list_audit_log(Some("alicia"), 10).unwrap().is_empty());
        assert_eq!(db.list_audit_log(Some("bob"), 10).unwrap().len(), 1);

        // a failed delete leaves the trail alone
        assert!(matches!(db.delete_user("nobody"), Err(Error::NotFound(_))));
        assert_eq!(db.list_audit_log(None, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_transaction_crud() {
        let db = Database::in_memory().unwrap();
        db.create_user("alice", "hash", "alice").unwrap();

        let mut tx = new_tx(date(2024, 2, 1), TransactionKind::Income, Category::Profit, 750_000);
        tx.note = Some("  ".to_string());
        let id = db.insert_transaction("alice", &tx, 75_000).unwrap();

        let saved = db.get_transaction("alice", id).unwrap().unwrap();
        assert_eq!(saved.amount, 750_000);
        assert_eq!(saved.emergency_fund, 75_000);
        assert_eq!(saved.date, date(2024, 2, 1));
        assert_eq!(saved.kind, TransactionKind::Income);
        assert!(saved.note.is_none(), "blank notes are stored as NULL");
        assert!(!saved.has_receipt);

        let update = TransactionUpdate {
            date: date(2024, 2, 2),
            kind: TransactionKind::Expense,
            category: Category::Water,
            amount: 80_000,
            note: Some("PDAM bill".to_string()),
            receipt: ReceiptChange::Replace(PNG.to_vec()),
        };
        assert!(db.update_transaction("alice", id, &update, 0).unwrap());
        let saved = db.get_transaction("alice", id).unwrap().unwrap();
        assert_eq!(saved.category, Category::Water);
        assert_eq!(saved.note.as_deref(), Some("PDAM bill"));
        assert!(saved.has_receipt);

        let receipt = db.get_receipt("alice", id).unwrap().unwrap();
        assert_eq!(receipt.image, PNG);
        assert_eq!(receipt.content_hash, crate::ledger::content_hash(PNG));

        let keep = TransactionUpdate {
            receipt: ReceiptChange::Keep,
            ..update.clone()
        };
        db.update_transaction("alice", id, &keep, 0).unwrap();
        assert!(db.get_receipt("alice", id).unwrap().is_some());

        let remove = TransactionUpdate {
            receipt: ReceiptChange::Remove,
            ..update
        };
        db.update_transaction("alice", id, &remove, 0).unwrap();
        assert!(db.get_receipt("alice", id).unwrap().is_none());

        assert!(db.delete_transaction("alice", id).unwrap());
        assert!(!db.delete_transaction("alice", id).unwrap());
        assert!(db.get_transaction("alice", id).unwrap().is_none());
    }

    #[test]
    fn test_transactions_scoped_to_owner() {
        let db = seeded();
        let bob_tx = db
            .list_transactions("bob", &TransactionFilter::default())
            .unwrap()
            .remove(0);

        assert!(db.get_transaction("alice", bob_tx.id).unwrap().is_none());
        assert!(!db.delete_transaction("alice", bob_tx.id).unwrap());
        let update = TransactionUpdate {
            date: bob_tx.date,
            kind: bob_tx.kind,
            category: bob_tx.category,
            amount: 1,
            note: None,
            receipt: ReceiptChange::Keep,
        };
        assert!(!db.update_transaction("alice", bob_tx.id, &update, 0).unwrap());
        assert_eq!(
            db.get_transaction("bob", bob_tx.id).unwrap().unwrap().amount,
            9_999
        );
    }

    #[test]
    fn test_list_filters() {
        let db = seeded();
        let all = db
            .list_transactions("alice", &TransactionFilter::default())
            .unwrap();
        assert_eq!(all.len(), 6);
        // newest first
        assert_eq!(all[0].date, date(2024, 3, 2));
        assert_eq!(all[5].date, date(2023, 12, 30));

        let income = TransactionFilter::new().kind(Some(TransactionKind::Income));
        assert_eq!(db.list_transactions("alice", &income).unwrap().len(), 3);

        let rent = TransactionFilter::new().category(Some(Category::Rent));
        assert_eq!(db.list_transactions("alice", &rent).unwrap().len(), 1);

        let day = TransactionFilter::new().period(PeriodFilter::Day {
            date: date(2024, 1, 5),
        });
        assert_eq!(db.list_transactions("alice", &day).unwrap().len(), 2);

        let january = TransactionFilter::new().period(PeriodFilter::Month { month: 1 });
        assert_eq!(db.list_transactions("alice", &january).unwrap().len(), 3);

        let year_2024 = TransactionFilter::new().period(PeriodFilter::Year { year: 2024 });
        assert_eq!(db.list_transactions("alice", &year_2024).unwrap().len(), 5);

        let range = TransactionFilter::new().period(PeriodFilter::Range {
            from: date(2023, 12, 30),
            to: date(2024, 1, 5),
        });
        assert_eq!(db.list_transactions("alice", &range).unwrap().len(), 3);
        assert_eq!(db.count_transactions("alice", &range).unwrap(), 3);
    }

    #[test]
    fn test_dashboard() {
        let db = seeded();
        let summary = db
            .get_dashboard("alice", &TransactionFilter::default())
            .unwrap();

        assert_eq!(summary.total_income, 3_500_000);
        assert_eq!(summary.total_expense, 2_000_000);
        assert_eq!(summary.net_profit, 1_500_000);
        assert_eq!(summary.total_emergency_fund, 350_000);
        assert_eq!(summary.first_date, Some(date(2023, 12, 30)));
        assert_eq!(summary.last_date, Some(date(2024, 3, 2)));

        assert_eq!(summary.daily.len(), 4);
        assert_eq!(
            summary.daily[1],
            DailyTotals {
                date: date(2024, 1, 5),
                income: 1_000_000,
                expense: 200_000,
            }
        );
        // days with only one kind are zero-filled on the other side
        assert_eq!(summary.daily[2].income, 0);
        assert_eq!(summary.daily[0].expense, 0);

        assert_eq!(summary.categories[0].category, Category::Profit);
        assert_eq!(summary.categories[0].amount, 3_500_000);
        assert_eq!(summary.categories[0].transaction_count, 3);
        assert_eq!(summary.categories.len(), 4);
    }

    #[test]
    fn test_dashboard_empty_filter() {
        let db = seeded();
        let filter = TransactionFilter::new().period(PeriodFilter::Year { year: 1999 });
        let summary = db.get_dashboard("alice", &filter).unwrap();
        assert_eq!(summary.total_income, 0);
        assert_eq!(summary.net_profit, 0);
        assert!(summary.first_date.is_none());
        assert!(summary.daily.is_empty());
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_available_periods() {
        let db = seeded();
        let periods = db.get_available_periods("alice").unwrap();
        assert_eq!(periods.months, vec![1, 3, 12]);
        assert_eq!(periods.years, vec![2023, 2024]);

        let periods = db.get_available_periods("nobody").unwrap();
        assert!(periods.months.is_empty());
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        db.log_audit("alice", "transaction.create", Some("transaction"), Some(1), None)
            .unwrap();
        db.log_audit("bob", "login", None, None, Some("{\"ok\":true}"))
            .unwrap();

        let all = db.list_audit_log(None, 10).unwrap();
        assert_eq!(all.len(), 2);

        let alice = db.list_audit_log(Some("alice"), 10).unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].action, "transaction.create");
        assert_eq!(alice[0].entity_id, Some(1));
    }
}

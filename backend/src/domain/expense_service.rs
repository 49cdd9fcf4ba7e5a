//! Expense service domain logic.
//!
//! ## Key Responsibilities
//!
//! - Validate and record new expenses, stamping the date and creation time
//! - List expenses newest first, narrowed by an [`ExpenseFilter`]
//! - Apply inline edits and deletes
//! - Expose the change feed so callers can re-read after writes

use anyhow::Result;
use chrono::Utc;
use shared::{ChangeEvent, ExpenseValidationError};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::domain::aggregation::grand_total;
use crate::domain::commands::expenses::{CreateExpenseCommand, DeleteExpenseResult, ExpenseListResult};
use crate::domain::date_bucket::{DateBucketer, DateValue};
use crate::domain::expense_form::ExpenseFormService;
use crate::domain::filter::ExpenseFilter;
use crate::domain::models::expense::{Expense, ExpenseChanges, ExpenseError};
use crate::storage::{Connection, ExpenseStorage};

#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    connection: Arc<C>,
    expense_repository: C::ExpenseRepository,
    form_service: ExpenseFormService,
    bucketer: DateBucketer,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: Arc<C>, form_service: ExpenseFormService, bucketer: DateBucketer) -> Self {
        let expense_repository = connection.create_expense_repository();
        Self {
            connection,
            expense_repository,
            form_service,
            bucketer,
        }
    }

    pub fn bucketer(&self) -> &DateBucketer {
        &self.bucketer
    }

    pub fn form_service(&self) -> &ExpenseFormService {
        &self.form_service
    }

    pub async fn create_expense(&self, command: CreateExpenseCommand) -> Result<Expense> {
        let fields = ExpenseChanges {
            description: Some(command.description),
            amount: Some(command.amount),
            paid_by: Some(command.paid_by),
            category: Some(command.category),
        };
        let validation = self.form_service.validate_changes(&fields);
        if !validation.is_valid {
            let message = self
                .form_service
                .get_first_error_message(&validation.errors)
                .unwrap_or_else(|| "Invalid expense".to_string());
            warn!("Rejected expense: {}", message);
            return Err(ExpenseError::Validation(message).into());
        }

        let now = Utc::now();
        let date = match command.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let parsed = self.bucketer.parse_text(raw).ok_or_else(|| {
                    ExpenseError::Validation(
                        self.form_service
                            .get_error_message(&ExpenseValidationError::InvalidDate(raw.to_string())),
                    )
                })?;
                DateValue::Native(parsed)
            }
            _ => DateValue::Native(now),
        };

        let mut expense = Expense {
            id: Expense::generate_id(),
            amount: 0.0,
            description: String::new(),
            paid_by: String::new(),
            category: String::new(),
            date: Some(date),
            created_at: Some(now),
        };
        fields.apply_to(&mut expense);

        self.expense_repository.store_expense(&expense).await?;
        info!(
            "Created expense {} ({} paid {})",
            expense.id, expense.paid_by, expense.amount
        );
        Ok(expense)
    }

    pub async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>> {
        self.expense_repository.get_expense(expense_id).await
    }

    /// Every stored expense, newest first. Undated records sort last.
    pub async fn all_expenses(&self) -> Result<Vec<Expense>> {
        let mut expenses = self.expense_repository.list_expenses().await?;
        expenses.sort_by(|a, b| self.compare_newest_first(a, b));
        Ok(expenses)
    }

    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<ExpenseListResult> {
        let all = self.all_expenses().await?;
        let expenses: Vec<Expense> = filter
            .apply(&all, &self.bucketer)
            .into_iter()
            .cloned()
            .collect();
        let total = grand_total(&expenses);
        Ok(ExpenseListResult { expenses, total })
    }

    pub async fn update_expense(&self, expense_id: &str, changes: ExpenseChanges) -> Result<Expense> {
        if changes.is_empty() {
            return Err(ExpenseError::Validation("No changes provided".to_string()).into());
        }

        let validation = self.form_service.validate_changes(&changes);
        if !validation.is_valid {
            let message = self
                .form_service
                .get_first_error_message(&validation.errors)
                .unwrap_or_else(|| "Invalid expense".to_string());
            return Err(ExpenseError::Validation(message).into());
        }

        match self
            .expense_repository
            .update_expense_fields(expense_id, &changes)
            .await?
        {
            Some(expense) => Ok(expense),
            None => Err(ExpenseError::NotFound(expense_id.to_string()).into()),
        }
    }

    /// Deleting an id that no longer exists succeeds with `deleted: false`
    pub async fn delete_expense(&self, expense_id: &str) -> Result<DeleteExpenseResult> {
        let deleted = self.expense_repository.delete_expense(expense_id).await?;
        let success_message = if deleted {
            "Expense deleted".to_string()
        } else {
            "Expense was already deleted".to_string()
        };
        Ok(DeleteExpenseResult {
            id: expense_id.to_string(),
            deleted,
            success_message,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.connection.subscribe()
    }

    fn compare_newest_first(&self, a: &Expense, b: &Expense) -> Ordering {
        let a_date = self.bucketer.to_utc(a.date.as_ref());
        let b_date = self.bucketer.to_utc(b.date.as_ref());
        match (a_date, b_date) {
            (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::CsvConnection;
    use shared::ChangeKind;

    fn create_test_service(env: &TestEnvironment) -> ExpenseService<CsvConnection> {
        ExpenseService::new(
            Arc::new(env.connection.clone()),
            ExpenseFormService::new(),
            DateBucketer::utc(),
        )
    }

    fn command(description: &str, amount: f64, paid_by: &str, date: Option<&str>) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount,
            description: description.to_string(),
            paid_by: paid_by.to_string(),
            category: "Groceries".to_string(),
            date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_expense_defaults_date_to_now() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let before = Utc::now();
        let expense = service
            .create_expense(command("  Vegetables ", 250.0, "Nishant", None))
            .await
            .unwrap();

        assert!(expense.id.starts_with("expense::"));
        assert_eq!(expense.description, "Vegetables");
        let date = service.bucketer().to_utc(expense.date.as_ref()).unwrap();
        assert!(date >= before);
        assert_eq!(expense.created_at, Some(date));
        assert_eq!(service.get_expense(&expense.id).await.unwrap(), Some(expense));
    }

    #[tokio::test]
    async fn test_create_expense_with_explicit_date() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let expense = service
            .create_expense(command("Fish", 400.0, "Rahul", Some("2025-03-14")))
            .await
            .unwrap();

        assert_eq!(service.bucketer().month_name(expense.date.as_ref()), "March");
    }

    #[tokio::test]
    async fn test_create_expense_rejects_invalid_input() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let cases = vec![
            command("", 10.0, "Rajat", None),
            command("Tea", 0.0, "Rajat", None),
            command("Tea", f64::NAN, "Rajat", None),
            command("Tea", 10.0, " ", None),
            command("Tea", 10.0, "Rajat", Some("yesterday")),
        ];
        for case in cases {
            let err = service.create_expense(case).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ExpenseError>(),
                Some(ExpenseError::Validation(_))
            ));
        }

        let mut uncategorized = command("Tea", 10.0, "Rajat", None);
        uncategorized.category = String::new();
        assert!(service.create_expense(uncategorized).await.is_err());

        assert!(service.all_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_filter_and_total() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        service.create_expense(command("old", 100.0, "A", Some("2025-07-01"))).await.unwrap();
        service.create_expense(command("new", 50.0, "B", Some("2025-07-20"))).await.unwrap();
        service.create_expense(command("mid", 25.0, "A", Some("2025-07-10"))).await.unwrap();

        let all = service.list_expenses(&ExpenseFilter::default()).await.unwrap();
        let order: Vec<&str> = all.expenses.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
        assert_eq!(all.total, 175.0);

        let only_a = service
            .list_expenses(&ExpenseFilter {
                paid_by: Some("A".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(only_a.expenses.len(), 2);
        assert_eq!(only_a.total, 125.0);
    }

    #[tokio::test]
    async fn test_update_expense() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);
        let expense = service.create_expense(command("Milk", 60.0, "Rajat", None)).await.unwrap();

        let updated = service
            .update_expense(
                &expense.id,
                ExpenseChanges {
                    amount: Some(65.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, 65.0);
        assert_eq!(updated.date, expense.date);

        let invalid = service
            .update_expense(
                &expense.id,
                ExpenseChanges {
                    amount: Some(-1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            invalid.downcast_ref::<ExpenseError>(),
            Some(ExpenseError::Validation(_))
        ));

        let missing = service
            .update_expense(
                "expense::missing",
                ExpenseChanges {
                    amount: Some(1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            missing.downcast_ref::<ExpenseError>(),
            Some(ExpenseError::NotFound(_))
        ));

        assert!(service
            .update_expense(&expense.id, ExpenseChanges::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_expense_is_idempotent() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);
        let expense = service.create_expense(command("Bread", 40.0, "Rahul", None)).await.unwrap();

        let first = service.delete_expense(&expense.id).await.unwrap();
        assert!(first.deleted);
        let second = service.delete_expense(&expense.id).await.unwrap();
        assert!(!second.deleted);
        assert!(service.all_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);
        let mut receiver = service.subscribe();

        let expense = service.create_expense(command("Eggs", 90.0, "Nishant", None)).await.unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Created);
        assert_eq!(event.key, expense.id);
    }
}

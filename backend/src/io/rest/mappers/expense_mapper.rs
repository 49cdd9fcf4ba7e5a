use chrono::SecondsFormat;
use shared::{
    CreateExpenseRequest, Expense as SharedExpense, ExpenseFilterRequest, UpdateExpenseRequest,
};

use crate::domain::commands::expenses::CreateExpenseCommand;
use crate::domain::date_bucket::DateBucketer;
use crate::domain::filter::ExpenseFilter;
use crate::domain::models::expense::{Expense as DomainExpense, ExpenseChanges};

pub struct ExpenseMapper;

impl ExpenseMapper {
    /// Public view of a stored expense with its date normalized for display
    pub fn to_dto(domain: &DomainExpense, bucketer: &DateBucketer) -> SharedExpense {
        let date = domain.date.as_ref();
        SharedExpense {
            id: domain.id.clone(),
            amount: domain.amount,
            description: domain.description.clone(),
            paid_by: domain.paid_by.clone(),
            category: domain.category.clone(),
            date: bucketer
                .to_local(date)
                .map(|local| local.to_rfc3339_opts(SecondsFormat::Secs, false)),
            month: bucketer.month_name(date),
            month_key: bucketer.month_key(date).map(|key| key.to_string()),
            created_at: domain
                .created_at
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    pub fn to_dtos(domain: &[DomainExpense], bucketer: &DateBucketer) -> Vec<SharedExpense> {
        domain.iter().map(|e| Self::to_dto(e, bucketer)).collect()
    }

    pub fn to_create_command(request: CreateExpenseRequest) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount: request.amount,
            description: request.description,
            paid_by: request.paid_by,
            category: request.category,
            date: request.date,
        }
    }

    pub fn to_changes(request: UpdateExpenseRequest) -> ExpenseChanges {
        ExpenseChanges {
            description: request.description,
            amount: request.amount,
            paid_by: request.paid_by,
            category: request.category,
        }
    }

    pub fn to_filter(request: ExpenseFilterRequest) -> ExpenseFilter {
        ExpenseFilter {
            description: request.description,
            amount: request.amount,
            amount_match: request.amount_match,
            paid_by: request.paid_by,
            category: request.category,
            month: request.month,
            month_key: request.month_key,
            day: request.day,
        }
    }
}

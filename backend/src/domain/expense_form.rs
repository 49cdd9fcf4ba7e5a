//! Expense entry form logic.
//!
//! Validation, amount parsing and user-facing messages for the form that adds
//! a new expense (and the inline edit of an existing one). The UI only renders
//! what this module decides.

use shared::{ExpenseFormValidation, ExpenseValidationError};

use crate::domain::models::expense::ExpenseChanges;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFormConfig {
    pub currency_symbol: String,
    pub max_description_length: usize,
    /// Whether a category must be picked before an expense can be written
    pub require_category: bool,
    /// Payer options offered by the form
    pub payers: Vec<String>,
    /// Category options offered by the form
    pub categories: Vec<String>,
}

impl Default for ExpenseFormConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            max_description_length: 256,
            require_category: true,
            payers: vec!["Nishant".to_string(), "Rajat".to_string(), "Rahul".to_string()],
            categories: vec![
                "Groceries".to_string(),
                "Outside Food".to_string(),
                "Meat".to_string(),
                "Other".to_string(),
            ],
        }
    }
}

#[derive(Clone)]
pub struct ExpenseFormService {
    config: ExpenseFormConfig,
}

impl ExpenseFormService {
    pub fn new() -> Self {
        Self {
            config: ExpenseFormConfig::default(),
        }
    }

    pub fn with_config(config: ExpenseFormConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpenseFormConfig {
        &self.config
    }

    /// Validate the add expense form input
    pub fn validate_expense_form(
        &self,
        description: &str,
        amount_input: &str,
        paid_by: &str,
        category: &str,
    ) -> ExpenseFormValidation {
        let mut errors = Vec::new();

        self.check_description(description, &mut errors);

        let cleaned_amount = if amount_input.trim().is_empty() {
            errors.push(ExpenseValidationError::EmptyAmount);
            None
        } else {
            match self.clean_and_parse_amount(amount_input) {
                Ok(amount) if amount <= 0.0 => {
                    errors.push(ExpenseValidationError::AmountNotPositive);
                    None
                }
                Ok(amount) => Some(amount),
                Err(parse_error) => {
                    errors.push(ExpenseValidationError::InvalidAmountFormat(parse_error));
                    None
                }
            }
        };

        if paid_by.trim().is_empty() {
            errors.push(ExpenseValidationError::EmptyPayer);
        }

        if self.config.require_category && category.trim().is_empty() {
            errors.push(ExpenseValidationError::EmptyCategory);
        }

        self.into_validation(errors, cleaned_amount)
    }

    /// Validate the field group of an inline edit. Absent fields are not checked.
    pub fn validate_changes(&self, changes: &ExpenseChanges) -> ExpenseFormValidation {
        let mut errors = Vec::new();

        if let Some(description) = &changes.description {
            self.check_description(description, &mut errors);
        }

        let cleaned_amount = match changes.amount {
            Some(amount) if !amount.is_finite() => {
                errors.push(ExpenseValidationError::InvalidAmountFormat(amount.to_string()));
                None
            }
            Some(amount) if amount <= 0.0 => {
                errors.push(ExpenseValidationError::AmountNotPositive);
                None
            }
            other => other,
        };

        if let Some(paid_by) = &changes.paid_by {
            if paid_by.trim().is_empty() {
                errors.push(ExpenseValidationError::EmptyPayer);
            }
        }

        if let Some(category) = &changes.category {
            if self.config.require_category && category.trim().is_empty() {
                errors.push(ExpenseValidationError::EmptyCategory);
            }
        }

        self.into_validation(errors, cleaned_amount)
    }

    fn check_description(&self, description: &str, errors: &mut Vec<ExpenseValidationError>) {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            errors.push(ExpenseValidationError::EmptyDescription);
        } else if trimmed.chars().count() > self.config.max_description_length {
            errors.push(ExpenseValidationError::DescriptionTooLong(trimmed.chars().count()));
        }
    }

    fn into_validation(
        &self,
        errors: Vec<ExpenseValidationError>,
        cleaned_amount: Option<f64>,
    ) -> ExpenseFormValidation {
        let messages = self.get_error_messages(&errors);
        ExpenseFormValidation {
            is_valid: errors.is_empty(),
            errors,
            cleaned_amount,
            messages,
        }
    }

    /// Clean and parse amount input string
    pub fn clean_and_parse_amount(&self, amount_input: &str) -> Result<f64, String> {
        let cleaned = amount_input
            .trim()
            .replace(&self.config.currency_symbol, "")
            .replace(',', "")
            .replace(' ', "");

        if cleaned.is_empty() {
            return Err("Empty amount after cleaning".to_string());
        }

        let amount = cleaned
            .parse::<f64>()
            .map_err(|e| format!("Invalid number format: {}", e))?;
        if !amount.is_finite() {
            return Err(format!("Invalid number format: {}", cleaned));
        }
        Ok(amount)
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.config.currency_symbol, amount)
    }

    pub fn generate_success_message(&self, description: &str, amount: f64) -> String {
        format!("Added {} for {}", self.format_amount(amount), description.trim())
    }

    pub fn get_error_message(&self, error: &ExpenseValidationError) -> String {
        match error {
            ExpenseValidationError::EmptyDescription => "Please enter a description".to_string(),
            ExpenseValidationError::DescriptionTooLong(len) => format!(
                "Description is too long ({} characters). Maximum is {}.",
                len, self.config.max_description_length
            ),
            ExpenseValidationError::EmptyAmount => "Please enter an amount".to_string(),
            ExpenseValidationError::InvalidAmountFormat(msg) => {
                format!("Please enter a valid amount (like 250 or 99.50): {}", msg)
            }
            ExpenseValidationError::AmountNotPositive => "Amount must be greater than 0".to_string(),
            ExpenseValidationError::EmptyPayer => "Please choose who paid".to_string(),
            ExpenseValidationError::EmptyCategory => "Please choose a category".to_string(),
            ExpenseValidationError::InvalidDate(raw) => format!("'{}' is not a valid date", raw),
        }
    }

    pub fn get_error_messages(&self, errors: &[ExpenseValidationError]) -> Vec<String> {
        errors.iter().map(|e| self.get_error_message(e)).collect()
    }

    pub fn get_first_error_message(&self, errors: &[ExpenseValidationError]) -> Option<String> {
        errors.first().map(|e| self.get_error_message(e))
    }

    /// Configured options followed by any extra values found in the data
    pub fn merge_options(configured: &[String], found: Vec<String>) -> Vec<String> {
        let mut options: Vec<String> = configured.to_vec();
        for value in found {
            if !options.contains(&value) {
                options.push(value);
            }
        }
        options
    }
}

impl Default for ExpenseFormService {
    fn default() -> Self {
        Self::new()
    }
}

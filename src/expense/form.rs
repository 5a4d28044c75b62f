//! Shared form parsing and rendering for expense creation and editing.
//!
//! The expense form is submitted as multipart so it can carry a receipt file
//! alongside the text fields.

use axum::extract::Multipart;
use maud::{Markup, html};
use time::{Date, macros::format_description};

use crate::{
    Error,
    category::Category,
    expense::{Expense, ExpenseBuilder, PaymentMethod},
    expense_type::ExpenseType,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE,
    },
};

/// The raw fields of a submitted expense form.
#[derive(Debug, Default, Clone)]
pub(super) struct ExpenseFormData {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub expense_type: String,
    pub payment_method: String,
    pub vendor: String,
    pub location: String,
    /// File name and contents of the uploaded receipt, if one was attached.
    pub receipt: Option<(String, Vec<u8>)>,
}

/// Drain a multipart request into an [ExpenseFormData].
///
/// Unknown fields are ignored. A receipt field without a file name or with
/// empty contents counts as 'no receipt attached'.
pub(super) async fn read_expense_multipart(
    mut multipart: Multipart,
) -> Result<ExpenseFormData, Error> {
    let mut form = ExpenseFormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "receipt" {
            let file_name = field.file_name().map(str::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|error| Error::MultipartError(error.to_string()))?;

            if let Some(file_name) = file_name
                && !file_name.is_empty()
                && !data.is_empty()
            {
                form.receipt = Some((file_name, data.to_vec()));
            }

            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        match name.as_str() {
            "description" => form.description = value,
            "amount" => form.amount = value,
            "date" => form.date = value,
            "category" => form.category = value,
            "expense_type" => form.expense_type = value,
            "payment_method" => form.payment_method = value,
            "vendor" => form.vendor = value,
            "location" => form.location = value,
            _ => {}
        }
    }

    Ok(form)
}

/// Coerce and validate the text fields into an [ExpenseBuilder].
///
/// The receipt is not handled here: endpoints store the file (if any) and
/// set the URL on the returned builder.
///
/// # Errors
/// This function will return an:
/// - [Error::EmptyDescription] or [Error::NonPositiveAmount] for invalid
///   description/amount (an unparseable amount counts as zero),
/// - [Error::InvalidDate] if the date is not an ISO date,
/// - [Error::InvalidForeignKey] if the category or type field is not an ID,
/// - [Error::InvalidPaymentMethod] for an unknown payment method.
pub(super) fn build_expense(form: &ExpenseFormData) -> Result<ExpenseBuilder, Error> {
    let amount: f64 = form.amount.trim().parse().unwrap_or(0.0);

    let date_format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(form.date.trim(), &date_format)
        .map_err(|_| Error::InvalidDate(form.date.clone()))?;

    let category_id = form
        .category
        .trim()
        .parse()
        .map_err(|_| Error::InvalidForeignKey)?;
    let expense_type_id = form
        .expense_type
        .trim()
        .parse()
        .map_err(|_| Error::InvalidForeignKey)?;

    let payment_method: PaymentMethod = form.payment_method.parse()?;

    Ok(Expense::build(
        &form.description,
        amount,
        date,
        category_id,
        expense_type_id,
        payment_method,
    )?
    .vendor(&form.vendor)
    .location(&form.location))
}

/// The values an expense form is pre-filled with.
#[derive(Debug, Default, Clone)]
pub(super) struct ExpenseFormValues {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category_id: Option<i64>,
    pub expense_type_id: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub vendor: String,
    pub location: String,
    pub receipt_url: Option<String>,
}

impl From<&Expense> for ExpenseFormValues {
    fn from(expense: &Expense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: format!("{:.2}", expense.amount),
            date: expense.date.to_string(),
            category_id: Some(expense.category_id),
            expense_type_id: Some(expense.expense_type_id),
            payment_method: Some(expense.payment_method),
            vendor: expense.vendor.clone(),
            location: expense.location.clone(),
            receipt_url: expense.receipt_url.clone(),
        }
    }
}

/// Whether the form submits a create or an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FormMethod {
    Post,
    Put,
}

/// Render the expense form.
pub(super) fn expense_form_view(
    method: FormMethod,
    endpoint: &str,
    submit_label: &str,
    values: &ExpenseFormValues,
    categories: &[Category],
    expense_types: &[ExpenseType],
    error_message: &str,
) -> Markup {
    let text_field = |id: &str, label: &str, input_type: &str, value: &str, required: bool| {
        html! {
            div
            {
                label for=(id) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(id)
                    type=(input_type)
                    name=(id)
                    value=(value)
                    step=[(input_type == "number").then_some("0.01")]
                    min=[(input_type == "number").then_some("0.01")]
                    required[required]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    };

    let fields = html! {
        (text_field("description", "Description", "text", &values.description, true))
        (text_field("amount", "Amount", "number", &values.amount, true))
        (text_field("date", "Date", "date", &values.date, true))

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category" name="category" required class=(FORM_SELECT_STYLE)
            {
                @for category in categories {
                    option
                        value=(category.id)
                        selected[values.category_id == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }

        div
        {
            label for="expense_type" class=(FORM_LABEL_STYLE) { "Expense Type" }

            select id="expense_type" name="expense_type" required class=(FORM_SELECT_STYLE)
            {
                @for expense_type in expense_types {
                    option
                        value=(expense_type.id)
                        selected[values.expense_type_id == Some(expense_type.id)]
                    {
                        (expense_type.name)
                    }
                }
            }
        }

        div
        {
            label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment Method" }

            select id="payment_method" name="payment_method" required class=(FORM_SELECT_STYLE)
            {
                @for payment_method in [PaymentMethod::Cash, PaymentMethod::Transfer] {
                    option
                        value=(payment_method.as_str())
                        selected[values.payment_method == Some(payment_method)]
                    {
                        (payment_method)
                    }
                }
            }
        }

        (text_field("vendor", "Vendor/Payee", "text", &values.vendor, false))
        (text_field("location", "Location", "text", &values.location, false))

        div
        {
            label for="receipt" class=(FORM_LABEL_STYLE) { "Receipt" }

            input
                id="receipt"
                type="file"
                name="receipt"
                accept="image/*,.pdf"
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(receipt_url) = &values.receipt_url {
                p class="mt-2 text-sm"
                {
                    a href=(receipt_url) target="_blank" class=(LINK_STYLE)
                    {
                        "View current receipt"
                    }
                }
            }
        }

        @if !error_message.is_empty() {
            p
            {
                (error_message)
            }
        }

        button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
    };

    match method {
        FormMethod::Post => html! {
            form
                hx-post=(endpoint)
                hx-encoding="multipart/form-data"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
            }
        },
        FormMethod::Put => html! {
            form
                hx-put=(endpoint)
                hx-encoding="multipart/form-data"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
            }
        },
    }
}

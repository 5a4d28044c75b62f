//! Alert partials for displaying success and error messages to users.
//!
//! Alerts are rendered into the fixed `#alert-container` element via htmx
//! response targeting, so endpoints can return them directly as the response
//! body with an appropriate status code.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_markup(self) -> Markup {
        let container_style = match self.alert_type {
            AlertType::Success => {
                "p-4 mb-4 rounded-lg border text-green-800 bg-green-50 \
                border-green-300 dark:bg-gray-800 dark:text-green-400 \
                dark:border-green-800"
            }
            AlertType::Error => {
                "p-4 mb-4 rounded-lg border text-red-800 bg-red-50 \
                border-red-300 dark:bg-gray-800 dark:text-red-400 \
                dark:border-red-800"
            }
        };

        html!(
            div class=(container_style) role="alert"
            {
                p class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    p class="mt-1 text-sm" { (self.details) }
                }

                button
                    type="button"
                    class="mt-2 text-sm underline cursor-pointer bg-transparent border-none"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "Dismiss"
                }
            }
        )
    }
}

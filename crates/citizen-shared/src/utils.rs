//! Utility functions

/// Keeps the first two characters of the local part so emails can be logged.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) if at_pos > 0 => {
            let (local, domain) = email.split_at(at_pos);
            let visible = if local.chars().count() <= 2 { 1 } else { 2 };
            let keep: String = local.chars().take(visible).collect();
            format!("{}***{}", keep, domain)
        }
        _ => "***".to_string(),
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentRequest {
    pub text: String,
}

impl NewCommentRequest {
    /// Trimmed text, between 1 and `MAX_COMMENT_LEN` characters.
    pub fn validated_text(&self) -> AppResult<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(AppError::validation("El comentario no puede estar vacío"));
        }
        if text.chars().count() > MAX_COMMENT_LEN {
            return Err(AppError::validation(format!(
                "El comentario supera {MAX_COMMENT_LEN} caracteres"
            )));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed() {
        let req = NewCommentRequest { text: "  Get schwifty  ".into() };
        assert_eq!(req.validated_text().unwrap(), "Get schwifty");
    }

    #[test]
    fn blank_and_oversized_text_rejected() {
        assert!(NewCommentRequest { text: "   ".into() }.validated_text().is_err());
        let long = "a".repeat(MAX_COMMENT_LEN + 1);
        assert!(NewCommentRequest { text: long }.validated_text().is_err());
        let max = "a".repeat(MAX_COMMENT_LEN);
        assert!(NewCommentRequest { text: max }.validated_text().is_ok());
    }
}

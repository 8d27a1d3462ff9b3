//! Multipart form parsing shared by the upload-carrying handlers.
//!
//! The content endpoints accept `multipart/form-data` with text fields
//! plus an optional file part named `file`. Repeated fields (`tags[]`)
//! accumulate in order.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;

use crate::error::AppError;

/// One uploaded file part.
#[derive(Debug)]
pub struct FilePart {
    pub name: String,
    pub data: Vec<u8>,
}

/// Parsed multipart body: text fields by name plus at most one file.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    file: Option<FilePart>,
}

impl FormData {
    /// Drains a multipart stream into memory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the stream is malformed.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                form.file = Some(FilePart {
                    name: file_name,
                    data: data.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    /// First value of a text field, if present and non-empty.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)?
            .first()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Required text field; rejects with 400 and `message` when absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the field is missing or empty.
    pub fn require(&self, name: &str, message: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(message.to_owned()))
    }

    /// All values of a repeated field, accepting both `name` and
    /// `name[]` spellings.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&str> {
        let bracketed = format!("{name}[]");
        self.fields
            .get(&bracketed)
            .or_else(|| self.fields.get(name))
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the repeated field was present at all. Distinguishes
    /// "no change" from "clear the list" on update.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        let bracketed = format!("{name}[]");
        self.fields.contains_key(&bracketed) || self.fields.contains_key(name)
    }

    #[must_use]
    pub fn file(&self) -> Option<&FilePart> {
        self.file.as_ref()
    }
}

/// Parse a path- or form-supplied id, rejecting with 400 on garbage.
pub fn parse_id<T: FromStr>(raw: &str, message: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(message.to_owned()))
}

/// Parse every id of a repeated field.
pub fn parse_ids<T: FromStr>(raw: &[&str], message: &str) -> Result<Vec<T>, AppError> {
    raw.iter().map(|value| parse_id(value, message)).collect()
}

/// Mirror of the original's first-letter capitalization on names.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first_letter() {
        assert_eq!(capitalize("fruit"), "Fruit");
        assert_eq!(capitalize("Fruit"), "Fruit");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let result: Result<uuid::Uuid, _> = parse_id("not-a-uuid", "Category id is not valid.");
        assert!(result.is_err());
    }
}

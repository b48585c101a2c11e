use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

use super::{
    dto::RegisterRequest,
    password::verify_password,
    repo::NewUser,
    repo_types::User,
};
use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,30}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Rejects birth dates strictly after `today`.
pub fn validate_birth_date(birth_date: Date, today: Date) -> AppResult<()> {
    if birth_date > today {
        return Err(AppError::validation(
            "La fecha de nacimiento no puede ser futura",
        ));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("El campo {field} es obligatorio")));
    }
    Ok(value.to_string())
}

/// Checks presence and shape of every registration field. The password is
/// still plain text in the result; hashing happens afterwards.
pub fn validate_registration(req: RegisterRequest, today: Date) -> AppResult<(NewUser, String)> {
    let first_name = validate_name("first_name", &req.first_name)?;
    let last_name = validate_name("last_name", &req.last_name)?;

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Email inválido"));
    }

    let username = req.username.trim().to_string();
    if !is_valid_username(&username) {
        return Err(AppError::validation("Nombre de usuario inválido"));
    }

    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("La contraseña es demasiado corta"));
    }

    validate_birth_date(req.birth_date, today)?;

    let new_user = NewUser {
        first_name,
        last_name,
        email,
        username,
        password_hash: String::new(),
        birth_date: req.birth_date,
    };
    Ok((new_user, req.password))
}

/// Resolves a login attempt. An unknown username and a wrong password yield
/// the same error.
pub fn check_credentials(user: Option<User>, password: &str) -> AppResult<User> {
    let Some(user) = user else {
        return Err(AppError::InvalidCredentials);
    };
    if verify_password(password, &user.password_hash)? {
        Ok(user)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

//! Request body validation. Each request type checks its own field
//! constraints and returns one `FieldError` per violation; an empty list
//! means the body is acceptable.

use crate::types::{
    CreatePetRequest, CreateTaskRequest, CreateUserRequest, CreateWeightRecordRequest, FieldError,
    Interval, UpdatePetRequest, UpdateTaskRequest, UpdateUserRequest, UpdateWeightRecordRequest,
};

fn check_title(title: &str, details: &mut Vec<FieldError>) {
    if title.chars().count() < 2 {
        details.push(FieldError::new("title", "Title must be at least 2 characters"));
    } else if title.chars().count() > 100 {
        details.push(FieldError::new("title", "Title cannot exceed 100 characters"));
    }
}

fn check_description(description: &str, details: &mut Vec<FieldError>) {
    if description.chars().count() > 500 {
        details.push(FieldError::new(
            "description",
            "Description cannot exceed 500 characters",
        ));
    }
}

fn check_interval(interval: &Interval, details: &mut Vec<FieldError>) {
    if interval.value < 1 {
        details.push(FieldError::new(
            "interval.value",
            "Interval value must be at least 1",
        ));
    }
}

fn check_name(name: &str, details: &mut Vec<FieldError>) {
    if name.is_empty() {
        details.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > 100 {
        details.push(FieldError::new("name", "Name cannot exceed 100 characters"));
    }
}

fn check_username(username: &str, details: &mut Vec<FieldError>) {
    if username.chars().count() < 3 {
        details.push(FieldError::new(
            "username",
            "Username must be at least 3 characters long",
        ));
    } else if username.chars().count() > 30 {
        details.push(FieldError::new(
            "username",
            "Username cannot exceed 30 characters",
        ));
    }
}

fn check_email(email: &str, details: &mut Vec<FieldError>) {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !well_formed {
        details.push(FieldError::new("email", "Invalid email format"));
    }
}

fn check_password(password: &str, details: &mut Vec<FieldError>) {
    if password.chars().count() < 8 {
        details.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        details.push(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        details.push(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        details.push(FieldError::new(
            "password",
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        details.push(FieldError::new(
            "password",
            "Password must contain at least one special character",
        ));
    }
}

fn check_weight(value: f64, details: &mut Vec<FieldError>) {
    if !value.is_finite() || value < 0.0 {
        details.push(FieldError::new("value", "Weight must be zero or greater"));
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        check_name(&self.name, &mut details);
        check_username(&self.username, &mut details);
        check_email(&self.email, &mut details);
        check_password(&self.password, &mut details);
        details
    }
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        if let Some(ref name) = self.name {
            check_name(name, &mut details);
        }
        if let Some(ref username) = self.username {
            check_username(username, &mut details);
        }
        if let Some(ref email) = self.email {
            check_email(email, &mut details);
        }
        details
    }
}

impl CreatePetRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        check_name(&self.name, &mut details);
        if self.species.is_empty() {
            details.push(FieldError::new("species", "Species is required"));
        }
        if self.breed.is_empty() {
            details.push(FieldError::new("breed", "Breed is required"));
        }
        details
    }
}

impl UpdatePetRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        if let Some(ref name) = self.name {
            check_name(name, &mut details);
        }
        if let Some(ref species) = self.species {
            if species.is_empty() {
                details.push(FieldError::new("species", "Species is required"));
            }
        }
        if let Some(ref breed) = self.breed {
            if breed.is_empty() {
                details.push(FieldError::new("breed", "Breed is required"));
            }
        }
        details
    }
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        check_title(&self.title, &mut details);
        if let Some(ref description) = self.description {
            check_description(description, &mut details);
        }
        if let Some(ref interval) = self.interval {
            check_interval(interval, &mut details);
        }
        details
    }
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        if let Some(ref title) = self.title {
            check_title(title, &mut details);
        }
        if let Some(ref description) = self.description {
            check_description(description, &mut details);
        }
        if let Some(Some(ref interval)) = self.interval {
            check_interval(interval, &mut details);
        }
        details
    }
}

impl CreateWeightRecordRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        check_weight(self.value, &mut details);
        details
    }
}

impl UpdateWeightRecordRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut details = Vec::new();
        if let Some(value) = self.value {
            check_weight(value, &mut details);
        }
        details
    }
}

//! Registration form.

use super::{or_default, BasePage, PageObject};
use crate::data::ValidRegistration;
use crate::driver::Driver;
use crate::result::ProbeResult;
use crate::session::Session;
use chrono::Utc;
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Form field with its own validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Email
    Email,
    /// Password
    Password,
    /// Confirm password
    ConfirmPassword,
}

impl Field {
    /// Every field in form order
    pub const ALL: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
    ];

    const fn input_key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
        }
    }

    const fn validation_key(self) -> &'static str {
        match self {
            Self::FirstName => "validation_first_name",
            Self::LastName => "validation_last_name",
            Self::Email => "validation_email",
            Self::Password => "validation_password",
            Self::ConfirmPassword => "validation_confirm_password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_key())
    }
}

/// Gender radio button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    /// "Male"
    Male,
    /// "Female"
    Female,
}

/// Values to enter on the registration form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RegistrationForm {
    pub gender: Option<Gender>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegistrationForm {
    /// Every field set from valid fixture data, password confirmed
    #[must_use]
    pub fn valid(data: &ValidRegistration) -> Self {
        Self {
            gender: None,
            first_name: Some(data.first_name.clone()),
            last_name: Some(data.last_name.clone()),
            email: Some(data.email.clone()),
            password: Some(data.password.clone()),
            confirm_password: Some(data.password.clone()),
        }
    }

    /// The same text in every text field
    #[must_use]
    pub fn all(text: &str) -> Self {
        Self {
            gender: None,
            first_name: Some(text.to_string()),
            last_name: Some(text.to_string()),
            email: Some(text.to_string()),
            password: Some(text.to_string()),
            confirm_password: Some(text.to_string()),
        }
    }

    /// Tick a gender
    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Replace the first name
    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Replace the email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Replace the confirmation
    #[must_use]
    pub fn with_confirm_password(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm_password.into());
        self
    }
}

/// An address no earlier run has registered
#[must_use]
pub fn unique_email() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("test.{}.{}@example.com", Utc::now().timestamp_millis(), &suffix[..6])
}

/// The /register page
#[derive(Debug, Clone, Copy)]
pub struct RegisterPage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> RegisterPage<'a, D> {
    /// Register page over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    /// Load the registration form
    pub fn open_register(&self) -> ProbeResult<()> {
        self.open()
    }

    /// Type into one field, replacing its content
    pub fn fill_field(&self, field: Field, text: &str) -> ProbeResult<()> {
        self.base.actions().type_text("register", field.input_key(), text, true)
    }

    /// Type the first name
    pub fn fill_first_name(&self, text: &str) -> ProbeResult<()> {
        self.fill_field(Field::FirstName, text)
    }

    /// Type the last name
    pub fn fill_last_name(&self, text: &str) -> ProbeResult<()> {
        self.fill_field(Field::LastName, text)
    }

    /// Type the email
    pub fn fill_email(&self, text: &str) -> ProbeResult<()> {
        self.fill_field(Field::Email, text)
    }

    /// Type the password
    pub fn fill_password(&self, text: &str) -> ProbeResult<()> {
        self.fill_field(Field::Password, text)
    }

    /// Type the password confirmation
    pub fn fill_confirm_password(&self, text: &str) -> ProbeResult<()> {
        self.fill_field(Field::ConfirmPassword, text)
    }

    /// Tick a gender radio button
    pub fn select_gender(&self, gender: Gender) -> ProbeResult<()> {
        let key = match gender {
            Gender::Male => "gender_male",
            Gender::Female => "gender_female",
        };
        self.base.actions().click("register", key)
    }

    /// Enter every value the form carries, in form order
    pub fn fill(&self, form: &RegistrationForm) -> ProbeResult<()> {
        if let Some(gender) = form.gender {
            self.select_gender(gender)?;
        }
        let values = [
            (Field::FirstName, &form.first_name),
            (Field::LastName, &form.last_name),
            (Field::Email, &form.email),
            (Field::Password, &form.password),
            (Field::ConfirmPassword, &form.confirm_password),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                self.fill_field(field, value)?;
            }
        }
        Ok(())
    }

    /// Press Register
    pub fn click_register(&self) -> ProbeResult<()> {
        info!(target: "storeprobe::pages", "submit registration");
        self.base.actions().click("register", "register_button")
    }

    /// Visible validation message of `field`, empty when none is shown
    pub fn validation_message(&self, field: Field) -> ProbeResult<String> {
        or_default(self.base.actions().text("register", field.validation_key()))
    }

    /// "Your registration completed" is shown
    pub fn is_registration_success(&self) -> ProbeResult<bool> {
        self.base.actions().is_displayed("register", "registration_completed")
    }

    /// The shop answered with its server error page
    pub fn is_internal_error_page(&self) -> ProbeResult<bool> {
        let url = or_default(self.base.current_url())?.to_lowercase();
        if url.contains("errorpage") || url.contains("aspxerrorpath") {
            return Ok(true);
        }
        let body = or_default(self.base.body_text())?;
        Ok(body.to_lowercase().contains("internal error occurred"))
    }
}

impl<'a, D: Driver + 'a> PageObject<'a, D> for RegisterPage<'a, D> {
    fn base(&self) -> &BasePage<'a, D> {
        &self.base
    }

    fn path(&self) -> &'static str {
        "register"
    }

    fn page_name(&self) -> &'static str {
        "register"
    }
}

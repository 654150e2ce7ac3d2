//! Registration scenarios.
//!
//! The negative cases reuse the valid fixture values and break one field.
//! `register_success` stores the new account for the login scenarios.

use super::{ensure, Scenario, StepError, StepResult, ORDER_REGISTER};
use crate::artifacts::{BugReport, RegisteredUser};
use crate::driver::Driver;
use crate::pages::{unique_email, Field, Gender, PageObject, RegisterPage, RegistrationForm};
use crate::session::Session;
use tracing::info;

const REQUIRED: [(Field, &str); 5] = [
    (Field::FirstName, "First name is required."),
    (Field::LastName, "Last name is required."),
    (Field::Email, "Email is required."),
    (Field::Password, "Password is required."),
    (Field::ConfirmPassword, "Password is required."),
];

pub(super) fn scenarios<D: Driver>() -> Vec<Scenario<D>> {
    vec![
        Scenario {
            name: "register_required_fields",
            description: "Submitting the empty form shows a required message for every field",
            tags: &["register"],
            order: ORDER_REGISTER,
            run: register_required_fields,
        },
        Scenario {
            name: "register_empty_spaces",
            description: "Whitespace-only input is treated as missing",
            tags: &["register"],
            order: ORDER_REGISTER,
            run: register_empty_spaces,
        },
        Scenario {
            name: "register_invalid_email",
            description: "A malformed email is rejected with \"Wrong email\"",
            tags: &["register"],
            order: ORDER_REGISTER,
            run: register_invalid_email,
        },
        Scenario {
            name: "register_password_mismatch",
            description: "A confirmation that differs from the password is rejected",
            tags: &["register"],
            order: ORDER_REGISTER,
            run: register_password_mismatch,
        },
        Scenario {
            name: "register_forbidden_characters",
            description: "Markup in the first name is rejected by validation, not by a server error",
            tags: &["register"],
            order: ORDER_REGISTER,
            run: register_forbidden_characters,
        },
        Scenario {
            name: "register_success",
            description: "Valid data with a fresh email completes registration",
            tags: &["smoke", "register"],
            order: ORDER_REGISTER,
            run: register_success,
        },
    ]
}

fn submit<D: Driver>(page: &RegisterPage<'_, D>, form: &RegistrationForm) -> StepResult {
    page.open_register()?;
    page.fill(form)?;
    page.click_register()?;
    Ok(())
}

fn expect_message<D: Driver>(page: &RegisterPage<'_, D>, field: Field, expected: &str) -> StepResult {
    let message = page.validation_message(field)?;
    ensure(
        message.contains(expected),
        format!("Expected {expected:?} for {field}, got: {message:?}"),
    )
}

fn register_required_fields<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    page.open_register()?;
    page.click_register()?;
    for (field, expected) in REQUIRED {
        expect_message(&page, field, expected)?;
    }
    Ok(())
}

fn register_empty_spaces<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    let spaces = &session.data().register.empty_spaces;
    submit(&page, &RegistrationForm::all(spaces))?;
    for (field, expected) in &REQUIRED[..4] {
        expect_message(&page, *field, expected)?;
    }
    Ok(())
}

fn register_invalid_email<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    let data = &session.data().register;
    let form = RegistrationForm::valid(&data.valid)
        .with_gender(Gender::Female)
        .with_email(data.invalid_email.clone());
    submit(&page, &form)?;
    expect_message(&page, Field::Email, "Wrong email")
}

fn register_password_mismatch<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    let data = &session.data().register;
    let form = RegistrationForm::valid(&data.valid)
        .with_gender(Gender::Male)
        .with_confirm_password(data.mismatch_confirm_password.clone());
    submit(&page, &form)?;
    expect_message(
        &page,
        Field::ConfirmPassword,
        "password and confirmation password do not match",
    )
}

fn register_forbidden_characters<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    let data = &session.data().register;
    let form = RegistrationForm::valid(&data.valid).with_first_name(data.forbidden_chars_name.clone());
    submit(&page, &form)?;

    if page.is_internal_error_page()? {
        let report = BugReport::new(
            "register_forbidden_characters",
            "Application showed its internal error page instead of a validation message on the register form.",
        )
        .detail("URL", page.current_url().unwrap_or_default())
        .detail(
            "Scenario",
            "First name contained forbidden characters (e.g. a script tag); expected form validation.",
        );
        session.bug_log().record(&report)?;
        return Err(StepError::Failed(
            "Application showed its internal error page instead of a validation message. This is a bug."
                .to_string(),
        ));
    }

    ensure(
        !page.is_registration_success()?,
        "Registration must not succeed when the first name contains forbidden characters.",
    )?;
    let message = page.validation_message(Field::FirstName)?;
    ensure(
        !message.is_empty(),
        "Expected a first name validation message for forbidden characters.",
    )
}

fn register_success<D: Driver>(session: &Session<D>) -> StepResult {
    let page = RegisterPage::new(session);
    let valid = &session.data().register.valid;
    let email = unique_email();
    let form = RegistrationForm::valid(valid)
        .with_gender(Gender::Female)
        .with_email(email.clone());
    submit(&page, &form)?;
    ensure(
        page.is_registration_success()?,
        "Expected \"Your registration completed\" after a valid registration.",
    )?;
    session
        .credentials()
        .save(&RegisteredUser::new(email.as_str(), valid.password.as_str()))?;
    info!(target: "storeprobe::suite", %email, "registered");
    Ok(())
}

//! Login and logout scenarios.

use super::{ensure, Scenario, StepError, StepResult, ORDER_LOGIN};
use crate::artifacts::RegisteredUser;
use crate::driver::Driver;
use crate::pages::LoginPage;
use crate::session::Session;

const UNKNOWN_EMAIL: (&str, &str) = ("nonexistent@invalid.example", "SomePass123!");
const WRONG_PASSWORD: (&str, &str) = ("anyuser@example.com", "WrongPassword123!");

pub(super) fn scenarios<D: Driver>() -> Vec<Scenario<D>> {
    vec![
        Scenario {
            name: "login_empty_fields",
            description: "Submitting the login form empty does not log in",
            tags: &["login"],
            order: ORDER_LOGIN,
            run: login_empty_fields,
        },
        Scenario {
            name: "login_invalid_email",
            description: "An unknown email does not log in",
            tags: &["login"],
            order: ORDER_LOGIN,
            run: login_invalid_email,
        },
        Scenario {
            name: "login_invalid_password",
            description: "A wrong password does not log in",
            tags: &["login"],
            order: ORDER_LOGIN,
            run: login_invalid_password,
        },
        Scenario {
            name: "login_success",
            description: "The last registered user logs in and sees their email in the header",
            tags: &["smoke", "login"],
            order: ORDER_LOGIN,
            run: login_success,
        },
        Scenario {
            name: "logout",
            description: "Logging out hides Log out and shows Log in again",
            tags: &["login"],
            order: ORDER_LOGIN,
            run: logout,
        },
    ]
}

/// Credentials saved by an earlier registration, or a skip
fn saved_user<D: Driver>(session: &Session<D>) -> Result<RegisteredUser, StepError> {
    session.credentials().load()?.ok_or_else(|| {
        StepError::Skipped(
            "No saved registered user. Run register_success first (registration runs before login)."
                .to_string(),
        )
    })
}

fn expect_logged_out<D: Driver>(page: &LoginPage<'_, D>, why: &str) -> StepResult {
    ensure(page.is_logout_link_absent()?, format!("User must not be logged in {why}."))
}

fn login_empty_fields<D: Driver>(session: &Session<D>) -> StepResult {
    let page = LoginPage::new(session);
    page.open_login_page()?;
    page.click_login_button()?;
    expect_logged_out(&page, "when email and password are empty")
}

fn login_invalid_email<D: Driver>(session: &Session<D>) -> StepResult {
    let page = LoginPage::new(session);
    let (email, password) = UNKNOWN_EMAIL;
    page.login_with(email, password)?;
    expect_logged_out(&page, "with an unknown email")
}

fn login_invalid_password<D: Driver>(session: &Session<D>) -> StepResult {
    let page = LoginPage::new(session);
    let (email, password) = WRONG_PASSWORD;
    page.login_with(email, password)?;
    expect_logged_out(&page, "with a wrong password")
}

fn login_success<D: Driver>(session: &Session<D>) -> StepResult {
    let user = saved_user(session)?;
    let page = LoginPage::new(session);
    page.login_with(&user.email, &user.password)?;
    ensure(
        page.is_logout_link_visible()?,
        "After a successful login the Log out link should be visible.",
    )?;
    ensure(
        page.is_logged_in_as(&user.email)?,
        format!("Header should show the logged-in user's email ({}).", user.email),
    )
}

fn logout<D: Driver>(session: &Session<D>) -> StepResult {
    let user = saved_user(session)?;
    let page = LoginPage::new(session);
    page.login_with(&user.email, &user.password)?;
    ensure(
        page.is_logout_link_visible()?,
        "Precondition: user must be logged in before logging out.",
    )?;
    page.click_logout()?;
    ensure(
        page.is_logout_link_absent()?,
        "After logout the Log out link should not be visible.",
    )?;
    ensure(
        page.is_login_link_visible()?,
        "After logout the Log in link should be visible again.",
    )
}

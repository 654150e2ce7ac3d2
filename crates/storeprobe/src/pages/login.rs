//! Login form and logged-in header state.

use super::{or_default, BasePage, PageObject};
use crate::driver::Driver;
use crate::result::ProbeResult;
use crate::session::Session;
use tracing::info;

/// Login page and header account links
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> LoginPage<'a, D> {
    /// Login page over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    /// Click "Log in" in the header
    pub fn click_login_link(&self) -> ProbeResult<()> {
        self.base.actions().click("login", "login_link")
    }

    /// Load the login page directly
    pub fn open_login_page(&self) -> ProbeResult<()> {
        self.open()
    }

    /// Type the email, replacing the field's content
    pub fn fill_email(&self, email: &str) -> ProbeResult<()> {
        self.base.actions().type_text("login", "email", email, true)
    }

    /// Type the password, replacing the field's content
    pub fn fill_password(&self, password: &str) -> ProbeResult<()> {
        self.base.actions().type_text("login", "password", password, true)
    }

    /// Submit the form
    pub fn click_login_button(&self) -> ProbeResult<()> {
        self.base.actions().click("login", "login_button")
    }

    /// Open the login page, fill both fields and submit
    pub fn login_with(&self, email: &str, password: &str) -> ProbeResult<()> {
        info!(target: "storeprobe::pages", email, "log in");
        self.open_login_page()?;
        self.fill_email(email)?;
        self.fill_password(password)?;
        self.click_login_button()
    }

    /// "Log out" shows up within the default wait
    pub fn is_logout_link_visible(&self) -> ProbeResult<bool> {
        self.base.actions().is_displayed("login", "logout_link")
    }

    /// "Log out" stays hidden for the short wait
    pub fn is_logout_link_absent(&self) -> ProbeResult<bool> {
        Ok(!self.base.actions().is_displayed_briefly("login", "logout_link")?)
    }

    /// "Log in" is shown in the header
    pub fn is_login_link_visible(&self) -> ProbeResult<bool> {
        self.base.actions().is_displayed("login", "login_link")
    }

    /// Text of the header account link, empty when absent
    pub fn header_account_text(&self) -> ProbeResult<String> {
        or_default(self.base.actions().text("login", "header_account_link"))
    }

    /// Logged in and `email` appears in the header account link or, failing
    /// that, anywhere on the page
    pub fn is_logged_in_as(&self, email: &str) -> ProbeResult<bool> {
        if !self.is_logout_link_visible()? {
            return Ok(false);
        }
        let email = email.trim().to_lowercase();
        if self.header_account_text()?.to_lowercase().contains(&email) {
            return Ok(true);
        }
        let body = or_default(self.base.body_text())?;
        Ok(body.to_lowercase().contains(&email))
    }

    /// Click "Log out" in the header
    pub fn click_logout(&self) -> ProbeResult<()> {
        self.base.actions().click("login", "logout_link")
    }
}

impl<'a, D: Driver + 'a> PageObject<'a, D> for LoginPage<'a, D> {
    fn base(&self) -> &BasePage<'a, D> {
        &self.base
    }

    fn path(&self) -> &'static str {
        "login"
    }

    fn page_name(&self) -> &'static str {
        "login"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::artifacts::RegisteredUser;
    use crate::pages::testing;

    const EMAIL: &str = "grace@example.com";
    const PASSWORD: &str = "Cobol#1959";

    #[test]
    fn test_login_success_shows_email() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context).with_account(RegisteredUser::new(EMAIL, PASSWORD));
        let session = testing::session(&context, &shop);
        let login = LoginPage::new(&session);
        login.login_with(EMAIL, PASSWORD).unwrap();
        assert!(login.is_logout_link_visible().unwrap());
        assert_eq!(login.header_account_text().unwrap(), EMAIL);
        assert!(login.is_logged_in_as(" GRACE@example.com ").unwrap());
        assert!(!login.is_logged_in_as("someone@else.com").unwrap());
    }

    #[test]
    fn test_wrong_password_stays_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context).with_account(RegisteredUser::new(EMAIL, PASSWORD));
        let session = testing::session(&context, &shop);
        let login = LoginPage::new(&session);
        login.login_with(EMAIL, "wrong").unwrap();
        assert!(login.is_logout_link_absent().unwrap());
        assert!(!login.is_logged_in_as(EMAIL).unwrap());
        assert_eq!(login.header_account_text().unwrap(), "");
    }

    #[test]
    fn test_login_link_then_logout() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context).with_account(RegisteredUser::new(EMAIL, PASSWORD));
        let session = testing::session(&context, &shop);
        let login = LoginPage::new(&session);
        login.click_login_link().unwrap();
        assert_eq!(login.current_url().unwrap(), "http://shop.test/login");
        login.fill_email(EMAIL).unwrap();
        login.fill_password(PASSWORD).unwrap();
        login.click_login_button().unwrap();
        login.click_logout().unwrap();
        assert!(login.is_logout_link_absent().unwrap());
        assert!(login.is_login_link_visible().unwrap());
    }
}

//! A fake Demo Web Shop assembled from the locator registry.
//!
//! [`DemoShop`] builds a [`FakeSite`] whose pages are found by exactly the
//! queries in the registry it is given: home with search box, search results,
//! product details, the Apparel & Shoes category with pager and every sort
//! order, login and registration with server-side validation. Submissions
//! are evaluated the way the real shop does, so whole scenarios run against
//! it unchanged.

use super::dom::{ClickEffect, FakeNode, FakeSite, FormValues, Outcome};
use super::FakeDriver;
use crate::artifacts::RegisteredUser;
use crate::locator::{LocatorEntry, LocatorRegistry};
use crate::pages::SortOption;
use crate::result::ProbeResult;
use crate::suite::DriverFactory;
use crate::verification::contains_keyword;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

const CATEGORY_PATH: &str = "apparel-shoes";

/// Locators the fake shop renders
const RENDERED: &[(&str, &str)] = &[
    ("common", "page_body"),
    ("home", "search_input"),
    ("home", "search_submit"),
    ("search_results", "product_grid"),
    ("search_results", "result_products"),
    ("search_results", "product_title_link"),
    ("product_box", "item"),
    ("product_box", "picture"),
    ("product_box", "details"),
    ("product_box", "title"),
    ("product_box", "price"),
    ("product_box", "add_to_cart"),
    ("category", "apparel_shoes_link"),
    ("category", "product_grid"),
    ("category", "item_boxes"),
    ("category", "product_titles"),
    ("category", "product_prices"),
    ("category", "sort_select"),
    ("category", "pager"),
    ("category", "current_page"),
    ("category", "next_page_link"),
    ("category", "previous_page_link"),
    ("category", "page_1_link"),
    ("category", "page_2_link"),
    ("login", "login_link"),
    ("login", "logout_link"),
    ("login", "header_account_link"),
    ("login", "email"),
    ("login", "password"),
    ("login", "login_button"),
    ("register", "gender_male"),
    ("register", "gender_female"),
    ("register", "first_name"),
    ("register", "last_name"),
    ("register", "email"),
    ("register", "password"),
    ("register", "confirm_password"),
    ("register", "register_button"),
    ("register", "validation_first_name"),
    ("register", "validation_last_name"),
    ("register", "validation_email"),
    ("register", "validation_password"),
    ("register", "validation_confirm_password"),
    ("register", "registration_completed"),
    ("product_details", "product_title"),
    ("product_details", "product_price"),
    ("product_details", "add_to_cart_button"),
];

/// A product listed by the fake shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopProduct {
    /// Display name
    pub name: String,
    /// Price text as rendered
    pub price: String,
    /// URL path of the details page
    pub slug: String,
}

impl ShopProduct {
    /// Product with a slug derived from its name
    #[must_use]
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            name,
            price: price.into(),
            slug,
        }
    }

    fn price_value(&self) -> f64 {
        self.price.trim().parse().unwrap_or(f64::MAX)
    }
}

fn default_catalog() -> Vec<ShopProduct> {
    vec![
        ShopProduct::new("Build your own cheap computer", "800.00"),
        ShopProduct::new("Build your own computer", "1200.00"),
        ShopProduct::new("Build your own expensive computer", "1800.00"),
        ShopProduct::new("Simple Computer", "800.00"),
        ShopProduct::new("Computing and Internet", "10.00"),
        ShopProduct::new("14.1-inch Laptop", "1590.00"),
    ]
}

fn default_apparel() -> Vec<ShopProduct> {
    vec![
        ShopProduct::new("Blue Jeans", "1.00"),
        ShopProduct::new("Casual Golf Belt", "1.00"),
        ShopProduct::new("Custom T-Shirt", "15.00"),
        ShopProduct::new("50's Rockabilly Polka Dot Top JR Plus Size", "11.00"),
        ShopProduct::new("Blue and green Sneaker", "11.00"),
        ShopProduct::new("Denim Short with Rhinestones", "10.00"),
        ShopProduct::new("Sunglasses", "25.00"),
        ShopProduct::new("Wool Hat", "13.00"),
        ShopProduct::new("Green and blue Sneaker", "11.00"),
        ShopProduct::new("Men's Wrinkle Free Long Sleeve", "11.00"),
        ShopProduct::new("Genuine Leather Handbag with Cell Phone Holder & Many Pockets", "35.00"),
    ]
}

/// Builder for a fake Demo Web Shop
#[derive(Debug, Clone)]
pub struct DemoShop {
    base_url: String,
    locators: BTreeMap<String, LocatorEntry>,
    catalog: Vec<ShopProduct>,
    apparel: Vec<ShopProduct>,
    page_size: usize,
    crash_on_markup: bool,
    ignore_sort: bool,
    accounts: Rc<RefCell<Vec<RegisteredUser>>>,
}

impl DemoShop {
    /// Shop rooted at `base_url`, rendering the queries of `registry`
    pub fn new(base_url: impl Into<String>, registry: &LocatorRegistry) -> ProbeResult<Self> {
        let mut locators = BTreeMap::new();
        for (section, key) in RENDERED {
            locators.insert(format!("{section}.{key}"), registry.resolve(section, key)?.clone());
        }
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            locators,
            catalog: default_catalog(),
            apparel: default_apparel(),
            page_size: 8,
            crash_on_markup: false,
            ignore_sort: false,
            accounts: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Replace the searchable catalogue
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<ShopProduct>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the Apparel & Shoes listing (in position order)
    #[must_use]
    pub fn with_apparel(mut self, apparel: Vec<ShopProduct>) -> Self {
        self.apparel = apparel;
        self
    }

    /// Products per category page
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Serve the server error page when a name contains markup
    #[must_use]
    pub const fn crashing_on_markup(mut self) -> Self {
        self.crash_on_markup = true;
        self
    }

    /// Serve every sort order in position order
    #[must_use]
    pub const fn ignoring_sort(mut self) -> Self {
        self.ignore_sort = true;
        self
    }

    /// Pre-registered account
    #[must_use]
    pub fn with_account(self, user: RegisteredUser) -> Self {
        self.accounts.borrow_mut().push(user);
        self
    }

    /// Accounts registered so far, shared by every site built from this shop
    #[must_use]
    pub fn accounts(&self) -> Vec<RegisteredUser> {
        self.accounts.borrow().clone()
    }

    /// Root URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the category listing
    #[must_use]
    pub fn category_url(&self, sort: Option<SortOption>, page: usize) -> String {
        format!("{}{}", self.base_url, category_path(sort, page))
    }

    /// Build the site
    #[must_use]
    pub fn site(&self) -> FakeSite {
        let model = Rc::new(self.clone());
        let mut site = FakeSite::new()
            .page(model.base_url.clone(), model.home(None))
            .page(model.url("login"), model.login_page(false))
            .page(model.url("register"), model.register_page(&Messages::default()))
            .page(model.url("search"), model.search_page(""));
        let sorts = std::iter::once(None).chain(SortOption::ALL.into_iter().map(Some));
        for sort in sorts {
            for page in 1..=model.page_count() {
                site.insert(model.category_url(sort, page), model.category_page(sort, page));
            }
        }
        for product in model.catalog.iter().chain(&model.apparel) {
            site.insert(model.url(&product.slug), model.product_page(product));
        }
        site
    }

    /// Fresh browser session on the site, starting at the home page
    pub fn driver(&self) -> ProbeResult<FakeDriver> {
        let driver = FakeDriver::new(self.site());
        crate::driver::Driver::navigate(&driver, &self.base_url)?;
        Ok(driver)
    }

    // -------------------------------------------------------------------------
    // building blocks
    // -------------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn at(&self, name: &str) -> LocatorEntry {
        self.locators
            .get(name)
            .cloned()
            .unwrap_or_else(|| LocatorEntry::css(name))
    }

    fn node(&self, name: &str) -> FakeNode {
        FakeNode::new(self.at(name))
    }

    fn link(&self, name: &str, text: &str, path: &str) -> FakeNode {
        self.node(name)
            .text(text)
            .attr("href", format!("/{}", path.trim_start_matches('/')))
            .on_click(ClickEffect::navigate(self.url(path)))
    }

    fn body(&self) -> FakeNode {
        self.node("common.page_body")
    }

    fn page_count(&self) -> usize {
        self.apparel.len().div_ceil(self.page_size).max(1)
    }

    fn header(self: &Rc<Self>, user: Option<&str>) -> FakeNode {
        let account = match user {
            Some(email) => FakeNode::group()
                .child(self.link("login.header_account_link", email, "customer/info"))
                .child(self.link("login.logout_link", "Log out", "")),
            None => FakeNode::group().child(self.link("login.login_link", "Log in", "login")),
        };
        let shop = Rc::clone(self);
        let search = FakeNode::group()
            .child(self.node("home.search_input").field("q"))
            .child(self.node("home.search_submit").attr("value", "Search").on_click(
                ClickEffect::submit(move |form| {
                    let term = form.get("q").trim().to_string();
                    Outcome::Render {
                        url: shop.url(&format!("search?q={term}")),
                        page: shop.search_page(&term),
                    }
                }),
            ));
        let menu = FakeNode::group().child(self.link(
            "category.apparel_shoes_link",
            "Apparel & Shoes",
            CATEGORY_PATH,
        ));
        FakeNode::group().child(account).child(search).child(menu)
    }

    fn product_box(&self, product: &ShopProduct, title_also: &str, price_also: Option<&str>) -> FakeNode {
        let title = self
            .link("product_box.title", &product.name, &product.slug)
            .also(self.at(title_also));
        let mut price = self.node("product_box.price").text(&product.price);
        if let Some(name) = price_also {
            price = price.also(self.at(name));
        }
        self.node("product_box.item")
            .child(self.node("product_box.picture"))
            .child(
                self.node("product_box.details")
                    .child(title)
                    .child(price)
                    .child(self.node("product_box.add_to_cart").attr("value", "Add to cart")),
            )
    }

    fn home(self: &Rc<Self>, user: Option<&str>) -> FakeNode {
        self.body()
            .child(self.header(user))
            .child(FakeNode::group().text("Welcome to our store"))
    }

    fn search_page(self: &Rc<Self>, term: &str) -> FakeNode {
        let found: Vec<&ShopProduct> = if term.is_empty() {
            Vec::new()
        } else {
            self.catalog
                .iter()
                .filter(|p| contains_keyword(&p.name, term))
                .collect()
        };
        let body = self.body().child(self.header(None));
        if found.is_empty() {
            return body.child(
                FakeNode::group().text("No products were found that matched your criteria."),
            );
        }
        let boxes = found.into_iter().map(|product| {
            self.node("search_results.result_products").child(self.product_box(
                product,
                "search_results.product_title_link",
                None,
            ))
        });
        body.child(self.node("search_results.product_grid").children(boxes))
    }

    fn product_page(self: &Rc<Self>, product: &ShopProduct) -> FakeNode {
        self.body().child(self.header(None)).child(
            FakeNode::group()
                .child(self.node("product_details.product_title").text(&product.name))
                .child(self.node("product_details.product_price").text(&product.price))
                .child(
                    self.node("product_details.add_to_cart_button")
                        .attr("value", "Add to cart"),
                ),
        )
    }

    fn sorted(&self, sort: Option<SortOption>) -> Vec<ShopProduct> {
        let mut products = self.apparel.clone();
        if self.ignore_sort {
            return products;
        }
        match sort {
            Some(SortOption::NameAsc) => products.sort_by_key(|p| p.name.to_lowercase()),
            Some(SortOption::NameDesc) => {
                products.sort_by_key(|p| std::cmp::Reverse(p.name.to_lowercase()));
            }
            Some(SortOption::PriceAsc) => {
                products.sort_by(|a, b| a.price_value().total_cmp(&b.price_value()));
            }
            Some(SortOption::PriceDesc) => {
                products.sort_by(|a, b| b.price_value().total_cmp(&a.price_value()));
            }
            Some(SortOption::CreatedOn) => products.reverse(),
            Some(SortOption::Position) | None => {}
        }
        products
    }

    fn category_page(self: &Rc<Self>, sort: Option<SortOption>, page: usize) -> FakeNode {
        let pages = self.page_count();
        let products = self.sorted(sort);
        let boxes = products
            .iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .map(|product| {
                self.node("category.item_boxes").child(self.product_box(
                    product,
                    "category.product_titles",
                    Some("category.product_prices"),
                ))
            });
        let select = self
            .node("category.sort_select")
            .options(SortOption::ALL.iter().map(|s| self.category_url(Some(*s), 1)))
            .value(self.category_url(Some(sort.unwrap_or(SortOption::Position)), 1))
            .navigates_on_change();
        let mut body = self
            .body()
            .child(self.header(None))
            .child(select)
            .child(self.node("category.product_grid").children(boxes));
        if pages > 1 {
            body = body.child(self.pager(sort, page, pages));
        }
        body
    }

    fn pager(&self, sort: Option<SortOption>, page: usize, pages: usize) -> FakeNode {
        let mut pager = self.node("category.pager");
        if page > 1 {
            pager = pager.child(self.link(
                "category.previous_page_link",
                "Previous",
                &category_path(sort, page - 1),
            ));
        }
        for number in 1..=pages {
            if number == page {
                pager = pager.child(self.node("category.current_page").text(number.to_string()));
            } else {
                let name = match number {
                    1 => "category.page_1_link",
                    2 => "category.page_2_link",
                    _ => "category.individual_page",
                };
                pager = pager.child(self.link(name, &number.to_string(), &category_path(sort, number)));
            }
        }
        if page < pages {
            pager = pager.child(self.link(
                "category.next_page_link",
                "Next",
                &category_path(sort, page + 1),
            ));
        }
        pager
    }

    fn login_page(self: &Rc<Self>, failed: bool) -> FakeNode {
        let shop = Rc::clone(self);
        let button = self.node("login.login_button").attr("value", "Log in").on_click(
            ClickEffect::submit(move |form| shop.submit_login(form)),
        );
        let mut form = FakeNode::group()
            .child(self.node("login.email").field("email"))
            .child(self.node("login.password").field("password"))
            .child(button);
        if failed {
            form = form.child(FakeNode::group().text(
                "Login was unsuccessful. Please correct the errors and try again.",
            ));
        }
        self.body().child(self.header(None)).child(form)
    }

    fn submit_login(self: &Rc<Self>, form: &FormValues) -> Outcome {
        let email = form.get("email").trim();
        let password = form.get("password");
        let known = self
            .accounts
            .borrow()
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(email) && user.password == password);
        if known && !email.is_empty() {
            Outcome::Render {
                url: self.base_url.clone(),
                page: self.home(Some(email)),
            }
        } else {
            Outcome::Render {
                url: self.url("login"),
                page: self.login_page(true),
            }
        }
    }

    fn register_page(self: &Rc<Self>, messages: &Messages) -> FakeNode {
        let shop = Rc::clone(self);
        let validation = |name: &str, message: &str| {
            self.node(name).text(message).shown(!message.is_empty())
        };
        self.body().child(self.header(None)).child(
            FakeNode::group()
                .child(self.node("register.gender_male").field("gender_male"))
                .child(self.node("register.gender_female").field("gender_female"))
                .child(self.node("register.first_name").field("first_name"))
                .child(validation("register.validation_first_name", &messages.first_name))
                .child(self.node("register.last_name").field("last_name"))
                .child(validation("register.validation_last_name", &messages.last_name))
                .child(self.node("register.email").field("email"))
                .child(validation("register.validation_email", &messages.email))
                .child(self.node("register.password").field("password"))
                .child(validation("register.validation_password", &messages.password))
                .child(self.node("register.confirm_password").field("confirm_password"))
                .child(validation(
                    "register.validation_confirm_password",
                    &messages.confirm_password,
                ))
                .child(
                    self.node("register.register_button")
                        .attr("value", "Register")
                        .on_click(ClickEffect::submit(move |form| shop.submit_register(form))),
                ),
        )
    }

    fn submit_register(self: &Rc<Self>, form: &FormValues) -> Outcome {
        let first_name = form.get("first_name");
        if self.crash_on_markup && first_name.contains('<') {
            return Outcome::Render {
                url: self.url("errorpage.htm?aspxerrorpath=/register"),
                page: self.body().child(FakeNode::group().text(
                    "An internal error occurred. Please contact the administrator.",
                )),
            };
        }
        let messages = Messages::validate(form, &self.accounts.borrow());
        if !messages.is_empty() {
            return Outcome::Render {
                url: self.url("register"),
                page: self.register_page(&messages),
            };
        }
        let email = form.get("email").trim().to_string();
        self.accounts
            .borrow_mut()
            .push(RegisteredUser::new(email.clone(), form.get("password")));
        Outcome::Render {
            url: self.url("registerresult/1"),
            page: self
                .body()
                .child(self.header(Some(&email)))
                .child(self.node("register.registration_completed").text("Your registration completed")),
        }
    }
}

impl DriverFactory for DemoShop {
    type Driver = FakeDriver;

    fn launch(&mut self) -> ProbeResult<FakeDriver> {
        self.driver()
    }
}

fn category_path(sort: Option<SortOption>, page: usize) -> String {
    let mut params = Vec::new();
    if let Some(sort) = sort {
        params.push(format!("orderby={}", sort.code()));
    }
    if page > 1 {
        params.push(format!("pagenumber={page}"));
    }
    if params.is_empty() {
        CATEGORY_PATH.to_string()
    } else {
        format!("{CATEGORY_PATH}?{}", params.join("&"))
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|part| !part.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Per-field registration messages
#[derive(Debug, Default)]
struct Messages {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    confirm_password: String,
}

impl Messages {
    fn validate(form: &FormValues, accounts: &[RegisteredUser]) -> Self {
        let required = |value: &str, message: &str| {
            if value.trim().is_empty() {
                message.to_string()
            } else {
                String::new()
            }
        };
        let mut messages = Self {
            first_name: required(form.get("first_name"), "First name is required."),
            last_name: required(form.get("last_name"), "Last name is required."),
            email: required(form.get("email"), "Email is required."),
            password: required(form.get("password"), "Password is required."),
            confirm_password: required(form.get("confirm_password"), "Password is required."),
        };
        if messages.first_name.is_empty() && form.get("first_name").contains(['<', '>']) {
            messages.first_name = "First name contains forbidden characters.".to_string();
        }
        let email = form.get("email").trim();
        if messages.email.is_empty() {
            if !looks_like_email(email) {
                messages.email = "Wrong email".to_string();
            } else if accounts.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
                messages.email = "The specified email already exists".to_string();
            }
        }
        if messages.password.is_empty() && form.get("password").chars().count() < 6 {
            messages.password = "The password should have at least 6 characters.".to_string();
        }
        if messages.confirm_password.is_empty() && form.get("confirm_password") != form.get("password") {
            messages.confirm_password =
                "The password and confirmation password do not match.".to_string();
        }
        messages
    }

    fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ]
        .iter()
        .all(|m| m.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{Driver, Element};
    use crate::wait::WaitCondition;
    use std::time::Duration;

    const BASE: &str = "http://shop.test/";

    fn shop() -> DemoShop {
        DemoShop::new(BASE, &LocatorRegistry::bundled().unwrap()).unwrap()
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            ShopProduct::new("50's Rockabilly Polka Dot Top", "11.00").slug,
            "50-s-rockabilly-polka-dot-top"
        );
    }

    #[test]
    fn test_category_paths() {
        assert_eq!(category_path(None, 1), "apparel-shoes");
        assert_eq!(category_path(None, 2), "apparel-shoes?pagenumber=2");
        assert_eq!(
            category_path(Some(SortOption::PriceAsc), 2),
            "apparel-shoes?orderby=10&pagenumber=2"
        );
    }

    #[test]
    fn test_site_has_every_category_route() {
        let site = shop().site();
        let urls: Vec<&str> = site.urls().collect();
        assert!(urls.contains(&"http://shop.test/apparel-shoes?orderby=15&pagenumber=2"));
        assert!(urls.contains(&"http://shop.test/build-your-own-computer"));
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("notanemail"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a b@example.com"));
    }

    #[test]
    fn test_validation_messages() {
        let mut form = FormValues::default();
        form.insert("password".into(), "secret1".into());
        form.insert("confirm_password".into(), "secret2".into());
        let messages = Messages::validate(&form, &[]);
        assert_eq!(messages.first_name, "First name is required.");
        assert_eq!(messages.email, "Email is required.");
        assert!(messages.password.is_empty());
        assert!(messages.confirm_password.contains("do not match"));
    }

    #[test]
    fn test_search_renders_matching_products() {
        let reg = LocatorRegistry::bundled().unwrap();
        let driver = shop().driver().unwrap();
        let input = driver
            .find_element(reg.resolve("home", "search_input").unwrap(), WaitCondition::Visible, Duration::ZERO)
            .unwrap();
        input.send_keys("computer").unwrap();
        driver
            .find_element(reg.resolve("home", "search_submit").unwrap(), WaitCondition::Clickable, Duration::ZERO)
            .unwrap()
            .click()
            .unwrap();
        assert_eq!(driver.current_url().unwrap(), "http://shop.test/search?q=computer");
        let boxes = driver
            .find_elements(reg.resolve("search_results", "result_products").unwrap(), Duration::ZERO)
            .unwrap();
        assert_eq!(boxes.len(), 4);
    }
}

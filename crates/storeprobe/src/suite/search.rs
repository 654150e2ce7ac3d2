//! Header search and product details scenarios.

use super::{check, ensure, Scenario, StepResult, ORDER_CATALOGUE};
use crate::driver::Driver;
use crate::pages::{HomePage, ProductDetailsPage, SearchResultsPage};
use crate::session::Session;

pub(super) fn scenarios<D: Driver>() -> Vec<Scenario<D>> {
    vec![
        Scenario {
            name: "search_box_visible",
            description: "The header search field is visible on the home page",
            tags: &["smoke", "search"],
            order: ORDER_CATALOGUE,
            run: search_box_visible,
        },
        Scenario {
            name: "search_keyword",
            description: "Searching the static keyword returns only matching products; names are written to the list file",
            tags: &["search"],
            order: ORDER_CATALOGUE,
            run: search_keyword,
        },
        Scenario {
            name: "search_computer_has_results",
            description: "Searching \"computer\" returns at least one product",
            tags: &["search"],
            order: ORDER_CATALOGUE,
            run: search_computer_has_results,
        },
        Scenario {
            name: "search_validate_names_and_prices",
            description: "Every search result has a name with letters and a numeric price",
            tags: &["search", "product_validation"],
            order: ORDER_CATALOGUE,
            run: search_validate_names_and_prices,
        },
        Scenario {
            name: "search_open_product_details",
            description: "The first search result opens a details page with title, price and Add to cart",
            tags: &["search", "product_validation"],
            order: ORDER_CATALOGUE,
            run: search_open_product_details,
        },
    ]
}

fn search_box_visible<D: Driver>(session: &Session<D>) -> StepResult {
    let home = HomePage::new(session);
    ensure(home.is_search_visible()?, "Search field should be visible on the home page.")
}

fn search_keyword<D: Driver>(session: &Session<D>) -> StepResult {
    let keyword = HomePage::new(session).search_build()?;
    let results = SearchResultsPage::new(session);
    check(results.verify_products_contain(&keyword))?;
    results.write_product_names_list()?;
    Ok(())
}

fn search_computer_has_results<D: Driver>(session: &Session<D>) -> StepResult {
    HomePage::new(session).search_with_keyword("computer")?;
    let count = SearchResultsPage::new(session).result_count()?;
    ensure(count > 0, "Search for \"computer\" returned no products.")
}

fn search_validate_names_and_prices<D: Driver>(session: &Session<D>) -> StepResult {
    HomePage::new(session).search_build()?;
    check(SearchResultsPage::new(session).verify_each_result_has_valid_name_and_price())
}

fn search_open_product_details<D: Driver>(session: &Session<D>) -> StepResult {
    HomePage::new(session).search_build()?;
    let results = SearchResultsPage::new(session);
    check(results.verify_first_item_has_add_to_cart())?;
    results.open_first_product_in_current_tab()?;

    let details = ProductDetailsPage::new(session);
    check(details.verify_title_not_empty())?;
    check(details.verify_price_valid())?;
    ensure(
        details.is_add_to_cart_visible()?,
        "Product details page should show the Add to cart button.",
    )
}

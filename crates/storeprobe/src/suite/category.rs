//! Apparel & Shoes listing: structure, pager and sort orders.

use super::{check, Scenario, StepResult, ORDER_CATALOGUE};
use crate::driver::Driver;
use crate::pages::{CategoryPage, SortOption};
use crate::session::Session;

pub(super) fn scenarios<D: Driver>() -> Vec<Scenario<D>> {
    vec![
        Scenario {
            name: "category_verification",
            description: "Apparel & Shoes shows well-formed products and a pager on both pages",
            tags: &["category"],
            order: ORDER_CATALOGUE,
            run: category_verification,
        },
        Scenario {
            name: "pagination_flow",
            description: "Next, Previous, page 2 and page 1 links move between pages",
            tags: &["category", "pagination"],
            order: ORDER_CATALOGUE,
            run: pagination_flow,
        },
        Scenario {
            name: "sort_name_a_to_z",
            description: "Name: A to Z orders both pages by name ascending",
            tags: &["category", "sorting"],
            order: ORDER_CATALOGUE,
            run: |session| sorted_on_both_pages(session, SortOption::NameAsc),
        },
        Scenario {
            name: "sort_name_z_to_a",
            description: "Name: Z to A orders both pages by name descending",
            tags: &["category", "sorting"],
            order: ORDER_CATALOGUE,
            run: |session| sorted_on_both_pages(session, SortOption::NameDesc),
        },
        Scenario {
            name: "sort_price_low_to_high",
            description: "Price: Low to High orders both pages by price ascending",
            tags: &["category", "sorting"],
            order: ORDER_CATALOGUE,
            run: |session| sorted_on_both_pages(session, SortOption::PriceAsc),
        },
        Scenario {
            name: "sort_price_high_to_low",
            description: "Price: High to Low orders both pages by price descending",
            tags: &["category", "sorting"],
            order: ORDER_CATALOGUE,
            run: |session| sorted_on_both_pages(session, SortOption::PriceDesc),
        },
        Scenario {
            name: "sort_created_on",
            description: "Created on is applied (orderby=15) and products show on both pages",
            tags: &["category", "sorting"],
            order: ORDER_CATALOGUE,
            run: sort_created_on,
        },
    ]
}

fn category_verification<D: Driver>(session: &Session<D>) -> StepResult {
    let category = CategoryPage::new(session);
    category.open_apparel_shoes()?;
    check(category.verify_products_displayed())?;
    check(category.verify_pager_present())?;
    check(category.verify_next_visible())?;

    category.go_to_next_page()?;
    check(category.verify_products_displayed())?;
    check(category.verify_current_page_number(2))
}

fn pagination_flow<D: Driver>(session: &Session<D>) -> StepResult {
    let category = CategoryPage::new(session);
    category.open_apparel_shoes()?;
    check(category.verify_products_displayed())?;
    check(category.verify_pager_present())?;
    check(category.verify_next_visible())?;
    check(category.verify_current_page_number(1))?;

    category.go_to_next_page()?;
    check(category.verify_previous_visible())?;
    check(category.verify_current_page_number(2))?;
    check(category.verify_products_displayed())?;

    category.go_to_previous_page()?;
    check(category.verify_products_displayed())?;
    check(category.verify_current_page_number(1))?;

    category.go_to_page_2()?;
    check(category.verify_previous_visible())?;
    check(category.verify_current_page_number(2))?;
    check(category.verify_products_displayed())?;

    category.go_to_page_1()?;
    check(category.verify_products_displayed())?;
    check(category.verify_current_page_number(1))
}

fn sorted_on_both_pages<D: Driver>(session: &Session<D>, option: SortOption) -> StepResult {
    let category = CategoryPage::new(session);
    category.open_apparel_shoes()?;
    category.select_sort_by(option)?;
    check(category.verify_sorted(option))?;
    category.go_to_next_page()?;
    check(category.verify_sorted(option))
}

fn sort_created_on<D: Driver>(session: &Session<D>) -> StepResult {
    let category = CategoryPage::new(session);
    category.open_apparel_shoes()?;
    category.select_sort_by(SortOption::CreatedOn)?;
    check(category.verify_sort_created_on_applied())?;
    category.go_to_next_page()?;
    check(category.verify_sort_created_on_applied())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::mock::ShopProduct;
    use crate::pages::testing;
    use crate::reporter::TestStatus;
    use crate::suite::testing::run_scenario;

    #[test]
    fn test_listing_scenarios_pass() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let mut shop = testing::shop(&context);
        for name in ["category_verification", "pagination_flow", "sort_price_low_to_high", "sort_created_on"] {
            let result = run_scenario(&context, &mut shop, name);
            assert_eq!(result.status, TestStatus::Passed, "{name}: {:?}", result.message);
        }
    }

    #[test]
    fn test_single_page_listing_has_no_next_link() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let mut shop = testing::shop(&context).with_page_size(20);
        let result = run_scenario(&context, &mut shop, "category_verification");
        assert_eq!(result.status, TestStatus::Failed);
        assert!(result.message.unwrap().contains("Pager"));
    }

    #[test]
    fn test_ignored_price_sort_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let mut shop = testing::shop(&context).ignoring_sort().with_apparel(vec![
            ShopProduct::new("Scarf", "20.00"),
            ShopProduct::new("Mitten", "5.00"),
            ShopProduct::new("Hat", "7.00"),
        ]);
        let result = run_scenario(&context, &mut shop, "sort_price_low_to_high");
        assert_eq!(result.status, TestStatus::Failed);
    }
}

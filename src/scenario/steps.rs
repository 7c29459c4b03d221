//! The ordered shop scenario
//!
//! Each step assumes the page and the server-side state left behind by the
//! step before it. None of them can be run on its own or reordered.

use crate::common::{Error, Result};
use crate::webdriver::{Browser, ElementRef};

use super::session::{assert_text_eq, assert_that, ShopSession};
use super::wait::TextMatch;

pub const MSG_USER_REGISTERED: &str = "User registered";
pub const MSG_USER_DELETED: &str = "User deleted!";
pub const MSG_USER_EXISTS: &str = "User already exists";
pub const STATUS_SOLD_OUT: &str = "Sold Out";
pub const STATUS_AVAILABLE: &str = "Fresh!";
pub const NAN_PRICE: &str = "$NaN";

/// Selectors for the controls the shop exposes
pub mod locators {
    use crate::webdriver::Locator;

    pub fn store_name_input() -> Locator {
        Locator::test_id("input", "store-name-input")
    }
    pub fn password_input() -> Locator {
        Locator::test_id("input", "password-input")
    }
    pub fn login_button() -> Locator {
        Locator::name("login")
    }
    pub fn register_button() -> Locator {
        Locator::name("register")
    }
    pub fn delete_button() -> Locator {
        Locator::name("delete")
    }
    pub fn message() -> Locator {
        Locator::test_id("p", "message")
    }
    pub fn empty_order_button() -> Locator {
        Locator::test_id("button", "empty-order-button")
    }
    pub fn load_sample_bugs_button() -> Locator {
        Locator::test_id("button", "load-sample-bugs-button")
    }
    pub fn clear_inventory_button() -> Locator {
        Locator::test_id("button", "clear-inventory-button")
    }
    pub fn add_to_order_button() -> Locator {
        Locator::test_id("button", "add-to-order-button")
    }
    pub fn shop_card() -> Locator {
        Locator::css(".menu-fish")
    }
    pub fn card_title() -> Locator {
        Locator::css("h3.fish-name")
    }
    pub fn card_button() -> Locator {
        Locator::css("button")
    }
    pub fn cart_line() -> Locator {
        Locator::css("li.order-enter-done")
    }
    pub fn cart_entry() -> Locator {
        Locator::css(".order-enter-done")
    }
    pub fn item_name_input() -> Locator {
        Locator::name("name")
    }
    pub fn item_price_input() -> Locator {
        Locator::name("price")
    }
    pub fn item_description_input() -> Locator {
        Locator::name("desc")
    }
    pub fn submit_button() -> Locator {
        Locator::css("button[type='submit']")
    }
    pub fn status_select() -> Locator {
        Locator::name("status")
    }
    pub fn cart_price() -> Locator {
        Locator::css(".price")
    }
    pub fn shop_price() -> Locator {
        Locator::test_id("span", "bug-shop-price")
    }
}

/// The steps of the scenario, in the only order they can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Register,
    Login,
    DeleteUser,
    AddSampleBugToCart,
    ReplaceInventoryAndAddToCart,
    MarkSoldOut,
    BreakPrice,
    RegisterExistingUser,
}

impl StepKind {
    pub const ALL: [StepKind; 8] = [
        StepKind::Register,
        StepKind::Login,
        StepKind::DeleteUser,
        StepKind::AddSampleBugToCart,
        StepKind::ReplaceInventoryAndAddToCart,
        StepKind::MarkSoldOut,
        StepKind::BreakPrice,
        StepKind::RegisterExistingUser,
    ];

    /// 1-based position in the scenario
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Stable identifier used in reports
    pub fn id(self) -> &'static str {
        match self {
            StepKind::Register => "test_1_register",
            StepKind::Login => "test_2_login",
            StepKind::DeleteUser => "test_3_delete_user",
            StepKind::AddSampleBugToCart => "test_4_add_bug_to_cart",
            StepKind::ReplaceInventoryAndAddToCart => "test_5_clear_inventory_add_new_bug_to_cart",
            StepKind::MarkSoldOut => "test_6_change_bug_status",
            StepKind::BreakPrice => "test_7_change_price",
            StepKind::RegisterExistingUser => "test_8_register_already_existing_user",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StepKind::Register => "Register a new user and check the success message",
            StepKind::Login => "Log in and land on the user's store with an empty order",
            StepKind::DeleteUser => "Go back to the login page and delete the user",
            StepKind::AddSampleBugToCart => {
                "Re-create and log in the deleted user, load sample bugs, add one to the cart"
            }
            StepKind::ReplaceInventoryAndAddToCart => {
                "Clear the inventory, create a new bug and add it to the cart"
            }
            StepKind::MarkSoldOut => "Mark the bug sold out and check shop and cart",
            StepKind::BreakPrice => "Make the bug available again and enter a non-numeric price",
            StepKind::RegisterExistingUser => {
                "Register the same user again, then delete it (cleanup)"
            }
        }
    }

    /// Look a step up by its 1-based number
    pub fn from_number(number: usize) -> Option<StepKind> {
        number
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Run this step against the session
    pub async fn execute<B: Browser>(self, session: &ShopSession<B>) -> Result<()> {
        match self {
            StepKind::Register => register(session).await,
            StepKind::Login => login(session).await,
            StepKind::DeleteUser => delete_user(session).await,
            StepKind::AddSampleBugToCart => add_sample_bug_to_cart(session).await,
            StepKind::ReplaceInventoryAndAddToCart => replace_inventory_and_add_to_cart(session).await,
            StepKind::MarkSoldOut => mark_sold_out(session).await,
            StepKind::BreakPrice => break_price(session).await,
            StepKind::RegisterExistingUser => register_existing_user(session).await,
        }
    }
}

// === Shared setup ===

/// Wait for the login form and fill in the scenario credentials
pub async fn fill_login_form<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let config = session.config();
    let username = session.wait_for_element(&locators::store_name_input()).await?;
    let password = session.find(&locators::password_input()).await?;

    session.fill(&username, &config.username).await?;
    session.fill(&password, &config.password).await
}

/// Submit the registration form and return the message it produces
pub async fn register_user<B: Browser>(session: &ShopSession<B>) -> Result<String> {
    fill_login_form(session).await?;
    session.click(&locators::register_button()).await?;

    let message = session.wait_for_element(&locators::message()).await?;
    session.text(&message).await
}

/// Log in and wait for the store page
pub async fn login_user<B: Browser>(session: &ShopSession<B>) -> Result<ElementRef> {
    fill_login_form(session).await?;
    session.click(&locators::login_button()).await?;
    session.wait_for_element(&locators::empty_order_button()).await
}

// === Steps ===

async fn register<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let message = register_user(session).await?;
    assert_text_eq("registration message", MSG_USER_REGISTERED, &message)
}

async fn login<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let empty_order = login_user(session).await?;
    assert_that(
        "empty order button displayed",
        session.is_displayed(&empty_order).await?,
    )?;

    let url = session.current_url().await?;
    assert_text_eq("store URL", &session.config().store_url(), &url)
}

async fn delete_user<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    session.back().await?;

    let config = session.config();
    let username = session.find(&locators::store_name_input()).await?;
    let password = session.find(&locators::password_input()).await?;
    session.fill(&username, &config.username).await?;
    session.fill(&password, &config.password).await?;

    session.click(&locators::delete_button()).await?;

    let message = session.wait_for_element(&locators::message()).await?;
    assert_text_eq("deletion message", MSG_USER_DELETED, &session.text(&message).await?)
}

/// Recreates the user removed by the previous step before shopping
async fn add_sample_bug_to_cart<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    session.refresh().await?;

    let message = register_user(session).await?;
    tracing::debug!(message = %message, "Registered user again");
    login_user(session).await?;

    session
        .click(&locators::load_sample_bugs_button())
        .await?;
    session.wait_for_element(&locators::shop_card()).await?;

    let label = &session.config().sample_label;
    let card = find_card(session, label).await?;
    let button = session
        .browser()
        .find_child(&card, &locators::card_button())
        .await?;
    session.browser().click(&button).await?;

    session.wait_for_visible(&locators::cart_line()).await?;
    Ok(())
}

/// First shop card whose title equals `label`
async fn find_card<B: Browser>(session: &ShopSession<B>, label: &str) -> Result<ElementRef> {
    for card in session.find_all(&locators::shop_card()).await? {
        let title = session
            .browser()
            .find_child(&card, &locators::card_title())
            .await?;
        if session.text(&title).await? == label {
            return Ok(card);
        }
    }
    Err(Error::not_found(format!(
        "shop card titled '{}'",
        label.replace('\n', " ")
    )))
}

async fn replace_inventory_and_add_to_cart<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let config = session.config();

    session.click(&locators::clear_inventory_button()).await?;

    session
        .type_into(&locators::item_name_input(), &config.item_name)
        .await?;
    session
        .type_into(&locators::item_price_input(), &config.item_price)
        .await?;
    session
        .type_into(&locators::item_description_input(), &config.item_description)
        .await?;
    session.click(&locators::submit_button()).await?;

    let card = session.wait_for_element(&locators::shop_card()).await?;
    assert_that("new bug displayed in shop", session.is_displayed(&card).await?)?;
    session.click(&locators::add_to_order_button()).await?;

    session.wait_for_visible(&locators::cart_entry()).await?;
    Ok(())
}

async fn mark_sold_out<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let status = session.wait_for_element(&locators::status_select()).await?;
    session.select_by_visible_text(&status, STATUS_SOLD_OUT).await?;

    session
        .wait_for_text(
            &locators::add_to_order_button(),
            TextMatch::EqualsIgnoreCase(STATUS_SOLD_OUT),
        )
        .await?;

    let unavailable = session.config().unavailable_message();
    session
        .wait_for_text(&locators::cart_line(), TextMatch::Equals(&unavailable))
        .await?;
    Ok(())
}

async fn break_price<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    let status = session.wait_for_element(&locators::status_select()).await?;
    session.select_by_visible_text(&status, STATUS_AVAILABLE).await?;

    session
        .type_into(&locators::item_price_input(), &session.config().invalid_price)
        .await?;

    session
        .wait_for_text(&locators::cart_price(), TextMatch::Equals(NAN_PRICE))
        .await?;
    session
        .wait_for_text(&locators::shop_price(), TextMatch::Equals(NAN_PRICE))
        .await?;
    Ok(())
}

async fn register_existing_user<B: Browser>(session: &ShopSession<B>) -> Result<()> {
    session.back().await?;

    let config = session.config();
    session
        .wait_for_element(&locators::store_name_input())
        .await?;
    session
        .type_into(&locators::store_name_input(), &config.username)
        .await?;
    session
        .type_into(&locators::password_input(), &config.password)
        .await?;
    session.click(&locators::register_button()).await?;

    let message = session.wait_for_element(&locators::message()).await?;
    assert_text_eq("registration message", MSG_USER_EXISTS, &session.text(&message).await?)?;

    session.click(&locators::delete_button()).await?;
    session
        .wait_for_text(&locators::message(), TextMatch::Contains(MSG_USER_DELETED))
        .await?;
    Ok(())
}

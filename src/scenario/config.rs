//! Immutable scenario data
//!
//! Everything the steps type into the page or compare against, resolved
//! once from the configuration file and CLI flags.

use crate::common::config::Config;
use crate::common::join_url;

/// Credentials, item data and URLs shared by every step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Shop landing page
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Item created after the inventory is cleared
    pub item_name: String,
    pub item_price: String,
    pub item_description: String,
    /// Text typed into the price field to break it
    pub invalid_price: String,
    /// Title of the sample card added to the cart
    pub sample_label: String,
}

impl ScenarioConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.shop.base_url.trim_end_matches('/').to_string(),
            username: config.credentials.username.clone(),
            password: config.credentials.password.clone(),
            item_name: config.item.name.clone(),
            item_price: config.item.price.clone(),
            item_description: config.item.description.clone(),
            invalid_price: config.item.invalid_price.clone(),
            sample_label: config.item.sample_label.clone(),
        }
    }

    /// URL of the logged-in user's store
    pub fn store_url(&self) -> String {
        join_url(&self.base_url, &format!("store/{}", self.username))
    }

    /// Cart line shown once the item is sold out
    pub fn unavailable_message(&self) -> String {
        format!("Sorry {} is no longer available.", self.item_name)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

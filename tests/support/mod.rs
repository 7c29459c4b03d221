//! In-memory stand-in for the workshop shop
//!
//! Implements `Browser` over a small model of the shop: a login page with
//! register/login/delete, and a store page with inventory, cart and item
//! edit forms. Messages and cart lines render a few lookups after the
//! action that caused them, like the real page does.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use shop_scenario::{Browser, ElementRef, Error, Locator, Result};

pub const BASE_URL: &str = "https://shop.test";

/// Minimal PNG signature, enough to tell screenshots apart from nothing
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Blank,
    Login,
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    /// Price in cents, as typed
    pub price: String,
    pub desc: String,
    pub available: bool,
}

impl Item {
    fn new(name: &str, price: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            desc: String::new(),
            available: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub inventory: Vec<Item>,
    /// Indices into `inventory`
    pub order: Vec<usize>,
}

#[derive(Debug)]
pub struct ShopState {
    pub users: HashMap<String, String>,
    pub history: Vec<Page>,
    pub stores: HashMap<String, Store>,
    pub username_field: String,
    pub password_field: String,
    pub message: Option<String>,
    pending_message: Option<(String, u32)>,
    cart_delay: u32,
    pub add_form: Item,
    /// Lookups before a message or cart line appears
    pub render_delay: u32,
    /// Text reads that still show the old value after an item edit
    pub text_lag: u32,
    /// Stale text per element id and the reads left before it refreshes
    lagging: HashMap<String, (String, u32)>,
    /// Elements rendered but not displayed; an entry ending in ':' hides
    /// every id with that prefix
    pub hidden: HashSet<String>,
    pub fail_screenshots: bool,
    pub screenshots: usize,
    pub closes: usize,
}

impl Default for ShopState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            history: vec![Page::Blank],
            stores: HashMap::new(),
            username_field: String::new(),
            password_field: String::new(),
            message: None,
            pending_message: None,
            cart_delay: 0,
            add_form: Item::new("", ""),
            render_delay: 2,
            text_lag: 2,
            lagging: HashMap::new(),
            hidden: HashSet::new(),
            fail_screenshots: false,
            screenshots: 0,
            closes: 0,
        }
    }
}

fn format_price(cents: &str) -> String {
    match cents.trim().parse::<f64>() {
        Ok(v) => format!("${:.2}", v / 100.0),
        Err(_) => "$NaN".to_string(),
    }
}

fn indexed(prefix: &str, id: &str) -> Option<usize> {
    id.strip_prefix(prefix).and_then(|rest| rest.parse().ok())
}

impl ShopState {
    pub fn page(&self) -> &Page {
        self.history.last().unwrap_or(&Page::Blank)
    }

    fn store(&self) -> Option<&Store> {
        match self.page() {
            Page::Store(user) => self.stores.get(user),
            _ => None,
        }
    }

    fn store_mut(&mut self) -> Option<&mut Store> {
        let user = match self.page() {
            Page::Store(user) => user.clone(),
            _ => return None,
        };
        self.stores.get_mut(&user)
    }

    /// Fresh render of the current page: inputs and messages reset
    fn reload(&mut self) {
        self.username_field.clear();
        self.password_field.clear();
        self.message = None;
        self.pending_message = None;
    }

    fn show_message(&mut self, text: &str) {
        self.pending_message = Some((text.to_string(), self.render_delay));
    }

    /// Advance asynchronous rendering by one lookup
    fn tick_message(&mut self) {
        if let Some((text, remaining)) = self.pending_message.take() {
            if remaining == 0 {
                self.message = Some(text);
            } else {
                self.pending_message = Some((text, remaining - 1));
            }
        }
    }

    fn tick_cart(&mut self) -> bool {
        if self.cart_delay > 0 {
            self.cart_delay -= 1;
            false
        } else {
            true
        }
    }

    /// Elements matching a rendered CSS selector on the current page
    fn lookup(&mut self, selector: &str) -> Vec<String> {
        let on_login = *self.page() == Page::Login;
        let item_count = self.store().map(|s| s.inventory.len()).unwrap_or(0);
        let order: Vec<usize> = self.store().map(|s| s.order.clone()).unwrap_or_default();
        let on_store = self.store().is_some();

        let one = |present: bool, id: &str| {
            if present {
                vec![id.to_string()]
            } else {
                Vec::new()
            }
        };
        let each = |prefix: &str| (0..item_count).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>();

        match selector {
            "input[data-testid='store-name-input']" => one(on_login, "store-name-input"),
            "input[data-testid='password-input']" => one(on_login, "password-input"),
            "*[name=\"login\"]" => one(on_login, "login"),
            "*[name=\"register\"]" => one(on_login, "register"),
            "*[name=\"delete\"]" => one(on_login, "delete"),
            "p[data-testid='message']" => {
                if !on_login {
                    return Vec::new();
                }
                self.tick_message();
                one(self.message.is_some(), "message")
            }
            "button[data-testid='empty-order-button']" => one(on_store, "empty-order-button"),
            "button[data-testid='load-sample-bugs-button']" => {
                one(on_store, "load-sample-bugs-button")
            }
            "button[data-testid='clear-inventory-button']" => {
                one(on_store, "clear-inventory-button")
            }
            ".menu-fish" => each("card:"),
            "button[data-testid='add-to-order-button']" => each("card-button:"),
            "span[data-testid='bug-shop-price']" => each("shop-price:"),
            "li.order-enter-done" | ".order-enter-done" => {
                if order.is_empty() || !self.tick_cart() {
                    return Vec::new();
                }
                order.iter().map(|i| format!("cart-line:{i}")).collect()
            }
            ".price" => {
                let mut found = one(!order.is_empty(), "cart-price");
                found.extend(each("shop-price:"));
                found
            }
            "*[name=\"status\"]" => each("edit-status:"),
            "*[name=\"name\"]" | "*[name=\"price\"]" | "*[name=\"desc\"]" => {
                if !on_store {
                    return Vec::new();
                }
                let field = selector
                    .trim_start_matches("*[name=\"")
                    .trim_end_matches("\"]");
                // Edit forms render above the add form
                let mut found = each(&format!("edit-{field}:"));
                found.push(format!("add-{field}"));
                found
            }
            "button[type='submit']" => one(on_store, "add-submit"),
            _ => Vec::new(),
        }
    }

    fn lookup_child(&self, parent: &str, selector: &str) -> Vec<String> {
        if let Some(i) = indexed("card:", parent) {
            return match selector {
                "h3.fish-name" => vec![format!("card-title:{i}")],
                "button" => vec![format!("card-button:{i}")],
                _ => Vec::new(),
            };
        }
        if let Some(i) = indexed("edit-status:", parent) {
            if selector == "option" {
                return vec![format!("option:{i}:Fresh!"), format!("option:{i}:Sold Out")];
            }
        }
        Vec::new()
    }

    fn item(&self, i: usize) -> Result<&Item> {
        self.store()
            .and_then(|s| s.inventory.get(i))
            .ok_or(Error::StaleElement)
    }

    fn text_of(&mut self, id: &str) -> Result<String> {
        if let Some((stale, reads)) = self.lagging.get_mut(id) {
            if *reads > 0 {
                *reads -= 1;
                return Ok(stale.clone());
            }
        }
        self.render_text(id)
    }

    /// Keep showing the current text of `ids` for the next few reads
    fn freeze(&mut self, ids: &[String]) {
        if self.text_lag == 0 {
            return;
        }
        for id in ids {
            if let Ok(text) = self.render_text(id) {
                self.lagging.insert(id.clone(), (text, self.text_lag));
            }
        }
    }

    fn is_hidden(&self, id: &str) -> bool {
        self.hidden
            .iter()
            .any(|h| h == id || (h.ends_with(':') && id.starts_with(h.as_str())))
    }

    fn render_text(&self, id: &str) -> Result<String> {
        if id == "message" {
            return self.message.clone().ok_or(Error::StaleElement);
        }
        if let Some(i) = indexed("card-title:", id) {
            let item = self.item(i)?;
            return Ok(format!("{}\n{}", item.name, format_price(&item.price)));
        }
        if let Some(i) = indexed("card-button:", id) {
            let item = self.item(i)?;
            return Ok(if item.available { "Add To Order" } else { "Sold Out" }.to_string());
        }
        if let Some(i) = indexed("shop-price:", id) {
            return Ok(format_price(&self.item(i)?.price));
        }
        if let Some(i) = indexed("cart-line:", id) {
            let item = self.item(i)?;
            return Ok(if item.available {
                format!("1 lbs {} {}", item.name, format_price(&item.price))
            } else {
                format!("Sorry {} is no longer available.", item.name)
            });
        }
        if id == "cart-price" {
            let store = self.store().ok_or(Error::StaleElement)?;
            let mut total = 0.0;
            for i in &store.order {
                let item = &store.inventory[*i];
                if !item.available {
                    continue;
                }
                match item.price.trim().parse::<f64>() {
                    Ok(v) => total += v,
                    Err(_) => return Ok("$NaN".to_string()),
                }
            }
            return Ok(format_price(&total.to_string()));
        }
        if let Some(rest) = id.strip_prefix("option:") {
            return Ok(rest.split(':').nth(1).unwrap_or_default().to_string());
        }
        // Inputs and buttons without visible text
        Ok(String::new())
    }

    fn click(&mut self, id: &str) -> Result<()> {
        match id {
            "register" => {
                let (user, pass) = (self.username_field.clone(), self.password_field.clone());
                if self.users.contains_key(&user) {
                    self.show_message("User already exists");
                } else {
                    self.users.insert(user, pass);
                    self.show_message("User registered");
                }
            }
            "delete" => {
                if self.users.remove(&self.username_field).is_some() {
                    let user = self.username_field.clone();
                    self.stores.remove(&user);
                    self.show_message("User deleted!");
                } else {
                    self.show_message("User not found");
                }
            }
            "login" => {
                let user = self.username_field.clone();
                if self.users.get(&user) == Some(&self.password_field) {
                    self.stores.entry(user.clone()).or_default();
                    self.history.push(Page::Store(user));
                } else {
                    self.show_message("Wrong password");
                }
            }
            "load-sample-bugs-button" => {
                let store = self.store_mut().ok_or(Error::StaleElement)?;
                store.inventory = vec![
                    Item::new("Ladybug", "1724"),
                    Item::new("Beetle", "3200"),
                    Item::new("Mantis", "4234"),
                ];
                store.order.clear();
            }
            "clear-inventory-button" => {
                let store = self.store_mut().ok_or(Error::StaleElement)?;
                store.inventory.clear();
                store.order.clear();
            }
            "add-submit" => {
                let item = std::mem::replace(&mut self.add_form, Item::new("", ""));
                self.store_mut()
                    .ok_or(Error::StaleElement)?
                    .inventory
                    .push(item);
            }
            "empty-order-button" => {
                self.store_mut().ok_or(Error::StaleElement)?.order.clear();
            }
            _ => {
                if let Some(i) = indexed("card-button:", id) {
                    let delay = self.render_delay;
                    let store = self.store_mut().ok_or(Error::StaleElement)?;
                    let available = store.inventory.get(i).ok_or(Error::StaleElement)?.available;
                    if available && !store.order.contains(&i) {
                        store.order.push(i);
                        self.cart_delay = delay;
                    }
                } else if let Some(rest) = id.strip_prefix("option:") {
                    let mut parts = rest.split(':');
                    let i: usize = parts.next().and_then(|p| p.parse().ok()).ok_or(Error::StaleElement)?;
                    let label = parts.next().unwrap_or_default();
                    self.freeze(&[format!("card-button:{i}"), format!("cart-line:{i}")]);
                    let store = self.store_mut().ok_or(Error::StaleElement)?;
                    let item = store.inventory.get_mut(i).ok_or(Error::StaleElement)?;
                    item.available = label == "Fresh!";
                }
            }
        }
        Ok(())
    }

    fn field(&mut self, id: &str) -> Result<&mut String> {
        match id {
            "store-name-input" => return Ok(&mut self.username_field),
            "password-input" => return Ok(&mut self.password_field),
            "add-name" => return Ok(&mut self.add_form.name),
            "add-price" => return Ok(&mut self.add_form.price),
            "add-desc" => return Ok(&mut self.add_form.desc),
            _ => {}
        }
        for (prefix, kind) in [("edit-name:", 0), ("edit-price:", 1), ("edit-desc:", 2)] {
            if let Some(i) = indexed(prefix, id) {
                let store = self.store_mut().ok_or(Error::StaleElement)?;
                let item = store.inventory.get_mut(i).ok_or(Error::StaleElement)?;
                return Ok(match kind {
                    0 => &mut item.name,
                    1 => &mut item.price,
                    _ => &mut item.desc,
                });
            }
        }
        Err(Error::webdriver_request_failed(
            "send keys",
            "element not interactable",
            id,
        ))
    }
}

/// Browser over the shop model; clones share one state
#[derive(Clone, Default)]
pub struct FakeShop {
    state: Arc<Mutex<ShopState>>,
}

impl FakeShop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shop where `username` is already registered
    pub fn with_user(username: &str, password: &str) -> Self {
        let shop = Self::new();
        shop.state()
            .users
            .insert(username.to_string(), password.to_string());
        shop
    }

    pub fn state(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Browser for FakeShop {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        if url.trim_end_matches('/') == BASE_URL {
            state.history.push(Page::Login);
            state.reload();
            Ok(())
        } else {
            Err(Error::webdriver_request_failed("navigate", "unknown error", url))
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(match self.state().page() {
            Page::Blank => "about:blank".to_string(),
            Page::Login => format!("{}/", BASE_URL),
            Page::Store(user) => format!("{}/store/{}", BASE_URL, user),
        })
    }

    async fn back(&self) -> Result<()> {
        let mut state = self.state();
        if state.history.len() > 1 {
            state.history.pop();
        }
        state.reload();
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.state().reload();
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        self.find_elements(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(locator))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let (_, selector) = locator.strategy();
        Ok(self
            .state()
            .lookup(&selector)
            .into_iter()
            .map(ElementRef)
            .collect())
    }

    async fn find_child(&self, parent: &ElementRef, locator: &Locator) -> Result<ElementRef> {
        self.find_children(parent, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(locator))
    }

    async fn find_children(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        let (_, selector) = locator.strategy();
        Ok(self
            .state()
            .lookup_child(parent.id(), &selector)
            .into_iter()
            .map(ElementRef)
            .collect())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        self.state().text_of(element.id())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        Ok(!self.state().is_hidden(element.id()))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.state().click(element.id())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.state().field(element.id())?.clear();
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        let mut state = self.state();
        if let Some(i) = indexed("edit-price:", element.id()) {
            state.freeze(&["cart-price".to_string(), format!("shop-price:{i}")]);
        }
        state.field(element.id())?.push_str(text);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let mut state = self.state();
        if state.fail_screenshots {
            return Err(Error::webdriver_request_failed(
                "take screenshot",
                "unable to capture screen",
                "renderer crashed",
            ));
        }
        state.screenshots += 1;
        Ok(FAKE_PNG.to_vec())
    }

    async fn close(&self) -> Result<()> {
        self.state().closes += 1;
        Ok(())
    }
}

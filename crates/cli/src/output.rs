//! Terminal rendering.

#![allow(clippy::print_stdout)]

use qkart_core::{CartLineItem, OrderSummary, Product, format_amount};
use qkart_storefront::notify::Notification;
use qkart_storefront::session::Session;
use rust_decimal::Decimal;

pub fn line(text: &str) {
    println!("{text}");
}

pub fn notifications(notifications: &[Notification]) {
    for notification in notifications {
        println!(
            "[{}] {}",
            notification.variant.as_str(),
            notification.message
        );
    }
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        println!(
            "{:<18} {:<40} {:<14} {:>10}  {}",
            product.id.as_str(),
            product.name,
            product.category,
            product.cost.to_string(),
            product.rating.stars()
        );
    }
}

pub fn cart(items: &[CartLineItem], total: Decimal) {
    if items.is_empty() {
        println!("Cart is empty. Add an item to the cart and it will show up here");
        return;
    }
    for item in items {
        println!(
            "{:<18} {:<40} {:>10} x {:<4}",
            item.product_id().as_str(),
            item.product.name,
            item.cost().to_string(),
            item.quantity
        );
    }
    println!("Order total {}", format_amount(total));
}

pub fn checkout(summary: &OrderSummary, balance: Option<&str>) {
    println!("{summary}");
    if let Some(balance) = balance {
        println!("Wallet balance ${balance}");
    }
}

pub fn whoami(session: &Session) {
    match session.username() {
        Some(username) => println!(
            "{username} (balance ${})",
            session.balance().unwrap_or("0")
        ),
        None => println!("Not logged in"),
    }
}

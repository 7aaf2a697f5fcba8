//! Plain-text rendering of storefront state.

use std::fmt::Write;

use gaming_store_core::UserIdentity;
use gaming_store_storefront::models::Product;
use gaming_store_storefront::services::{CartState, CartSummary, OrderConfirmation};

/// One catalog row: `[game 4] Elden Ring - 349 SAR (PS5, PC)`.
pub fn product_line(product: &Product) -> String {
    let mut line = format!(
        "[{} {}] {} - {}",
        product.kind, product.id, product.name, product.price
    );
    if !product.platform.is_empty() {
        let _ = write!(line, " ({})", product.platform.join(", "));
    }
    if product.is_out_of_stock() {
        line.push_str(" [out of stock]");
    }
    line
}

/// A titled catalog section.
pub fn section(title: &str, products: &[&Product]) -> String {
    let mut out = format!("{title}\n");
    if products.is_empty() {
        out.push_str("  (none)\n");
    }
    for product in products {
        let _ = writeln!(out, "  {}", product_line(product));
    }
    out
}

/// Cart contents with line totals and the grand total.
pub fn cart(state: &CartState) -> String {
    if state.is_empty() {
        return "Your cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in state.items() {
        let _ = writeln!(
            out,
            "  {} x {} [{} {}] @ {} = {}",
            item.quantity,
            item.name,
            item.kind,
            item.id,
            item.price,
            item.line_total()
        );
    }
    let _ = writeln!(out, "Total: {}", state.total());
    out
}

/// The cart badge: distinct items and total.
pub fn badge(summary: &CartSummary) -> String {
    let noun = if summary.item_count == 1 { "item" } else { "items" };
    format!("Cart: {} {noun}, {}", summary.item_count, summary.total)
}

/// Order acknowledgment.
pub fn confirmation(confirmation: &OrderConfirmation) -> String {
    let mut out = format!("{}\n", confirmation.message);
    if let Some(number) = &confirmation.order_number {
        let _ = writeln!(out, "Order number: {number}");
    }
    let _ = writeln!(
        out,
        "Total: {} ({} items) at {}",
        confirmation.total,
        confirmation.item_count,
        confirmation.placed_at.format("%Y-%m-%d %H:%M UTC")
    );
    out
}

/// Signed-in user.
pub fn identity(user: &UserIdentity) -> String {
    format!("{} <{}>", user.name, user.email)
}

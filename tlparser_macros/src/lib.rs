mod tracked;

use proc_macro::TokenStream;

/// Derive macro implementing `tlparser::Tracked` for an entity struct.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Debug, Serialize, Deserialize, Tracked)]
/// #[tracked(kind = "lamoda_product", collection = "lamoda_products")]
/// pub struct LamodaProduct {
///     #[tracked(key, identity)]
///     pub category: String,
///     #[tracked(identity)]
///     pub sku: String,
///     // ...
/// }
/// ```
///
/// - `kind` defaults to the snake_case struct name, `collection` to `kind` + `"s"`.
/// - `#[tracked(key)]` marks the request-key field (must be a `String`).
///   Without it a field named `key` is used.
/// - `#[tracked(identity)]` marks the upsert identity. Several fields are
///   joined with `tlparser::entity::join_identity`. Without any, the identity
///   is the key field.
/// - `#[tracked(parsed_at)]` marks the `DateTime<Utc>` field that sources
///   stamp with the fetch time.
#[proc_macro_derive(Tracked, attributes(tracked))]
pub fn derive_tracked(input: TokenStream) -> TokenStream {
    tracked::derive_tracked(input)
}

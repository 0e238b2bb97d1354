//! Typed inputs, one struct per store operation. The presentation layer
//! builds these from whatever transport it speaks; the store only ever
//! sees these shapes.

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct MessageEdit {
    pub id: i64,
    pub text: String,
}

// Presentation of a finished run: console table and HTML comparison page.

pub mod html;
pub mod table;

//! 同梱のデモ問題。

pub mod advection;

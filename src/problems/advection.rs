//! 1次元の移流方程式 u_t + c·u_x = 0。
//!
//! 定義域は t ∈ [0, 1]、x ∈ [-1, 1]、初期条件は u(0, x) = sin(πx) です。
//! 厳密解は u(t, x) = sin(π(x - t)) で、両端の境界値はともに sin(πt) に
//! なります。

use crate::domain::Span;
use crate::problem::{Condition, FieldSample, Problem};
use burn::tensor::Tensor;
use burn::tensor::backend::AutodiffBackend;
use std::f32::consts::PI;

/// 移流速度c
pub const ADVECTION_SPEED: f32 = 1.0;

// 入出力変数の列番号
const T: usize = 0;
const X: usize = 1;
const U: usize = 0;

/// 時空間の定義域（条件 'interior' のSpan）を返します。
pub fn domain() -> Span {
    Span::new().interval("t", 0.0, 1.0).interval("x", -1.0, 1.0)
}

/// 初期条件の残差 u - sin(πx)。
fn initial<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
    sample.output(U) - sample.input(X).mul_scalar(PI).sin()
}

/// 境界条件の残差 u - sin(πt)。厳密解の両端での値です。
fn boundary<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
    sample.output(U) - sample.input(T).mul_scalar(PI).sin()
}

/// 移流方程式の残差 u_t + c·u_x。
fn advection<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
    sample.partial(U, T) + sample.partial(U, X).mul_scalar(ADVECTION_SPEED)
}

/// 移流方程式のPINN問題を構築します。
pub fn problem<B: AutodiffBackend>() -> Problem<B> {
    Problem::new("advection", &["t", "x"], &["u"])
        .add_condition(
            "initial",
            Condition::new(Span::new().fixed("t", 0.0).interval("x", -1.0, 1.0), initial),
        )
        .and_then(|p| {
            p.add_condition(
                "boundary_left",
                Condition::new(Span::new().interval("t", 0.0, 1.0).fixed("x", -1.0), boundary),
            )
        })
        .and_then(|p| {
            p.add_condition(
                "boundary_right",
                Condition::new(Span::new().interval("t", 0.0, 1.0).fixed("x", 1.0), boundary),
            )
        })
        .and_then(|p| p.add_condition("interior", Condition::new(domain(), advection)))
        .expect("移流問題の条件はすべて定義域を網羅しています")
}

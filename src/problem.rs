//! 問題（Problem）の記述。
//!
//! 出力変数・入力変数の宣言と、名前付き条件（部分定義域と残差関数の組）で
//! 1つのPINN問題を表します。条件はBTreeMapで保持するため、学習・報告の
//! 走査順は常に名前の辞書順で決定的です。

use crate::domain::{SampleMode, SampledPoints, Span};
use crate::error::PinnError;
use burn::tensor::Tensor;
use burn::tensor::backend::AutodiffBackend;
use rand::Rng;
use std::collections::BTreeMap;

/// ある点群におけるモデルの入出力と1階偏導関数のまとまり。
///
/// 残差関数はこの構造体だけを受け取り、列の切り出しで
/// 各変数・各偏導関数にアクセスします。
#[derive(Debug, Clone)]
pub struct FieldSample<B: AutodiffBackend> {
    /// 入力座標 [n, 入力変数数]
    pub inputs: Tensor<B, 2>,
    /// モデル出力 [n, 出力変数数]
    pub outputs: Tensor<B, 2>,
    /// 出力変数ごとの勾配 [n, 入力変数数]
    pub gradients: Vec<Tensor<B, 2>>,
}

impl<B: AutodiffBackend> FieldSample<B> {
    /// input番目の入力変数の列 [n, 1] を返します。
    pub fn input(&self, input: usize) -> Tensor<B, 2> {
        let n = self.inputs.dims()[0];
        self.inputs.clone().slice([0..n, input..input + 1])
    }

    /// output番目の出力変数の列 [n, 1] を返します。
    pub fn output(&self, output: usize) -> Tensor<B, 2> {
        let n = self.outputs.dims()[0];
        self.outputs.clone().slice([0..n, output..output + 1])
    }

    /// output番目の出力変数の、input番目の入力変数に関する
    /// 偏導関数の列 [n, 1] を返します。
    pub fn partial(&self, output: usize, input: usize) -> Tensor<B, 2> {
        let grads = &self.gradients[output];
        let n = grads.dims()[0];
        grads.clone().slice([0..n, input..input + 1])
    }
}

/// 残差関数。0に収束させたい量を [n, 1] で返します。
pub type ResidualFn<B> = fn(&FieldSample<B>) -> Tensor<B, 2>;

/// 部分定義域と残差関数の組。
#[derive(Debug)]
pub struct Condition<B: AutodiffBackend> {
    location: Span,
    residuals: Vec<ResidualFn<B>>,
}

impl<B: AutodiffBackend> Condition<B> {
    /// 単一の残差関数を持つ条件を作成します。
    pub fn new(location: Span, residual: ResidualFn<B>) -> Self {
        Self {
            location,
            residuals: vec![residual],
        }
    }

    /// 複数の残差関数を持つ条件を作成します（連立方程式など）。
    pub fn with_residuals(location: Span, residuals: Vec<ResidualFn<B>>) -> Self {
        Self {
            location,
            residuals,
        }
    }

    /// 条件の定義域を返します。
    pub fn location(&self) -> &Span {
        &self.location
    }

    /// 残差関数のスライスを返します。
    pub fn residuals(&self) -> &[ResidualFn<B>] {
        &self.residuals
    }
}

/// PINN問題の記述。入力・出力変数と名前付き条件の集まりです。
#[derive(Debug)]
pub struct Problem<B: AutodiffBackend> {
    name: String,
    input_variables: Vec<String>,
    output_variables: Vec<String>,
    conditions: BTreeMap<String, Condition<B>>,
}

impl<B: AutodiffBackend> Problem<B> {
    /// 問題を作成します。入力変数の並びがテンソルの列順になります。
    pub fn new(name: &str, input_variables: &[&str], output_variables: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            input_variables: input_variables.iter().map(|s| s.to_string()).collect(),
            output_variables: output_variables.iter().map(|s| s.to_string()).collect(),
            conditions: BTreeMap::new(),
        }
    }

    /// 条件を追加します。
    ///
    /// 条件のSpanは問題の入力変数を過不足なく定義していなければなりません。
    pub fn add_condition(
        mut self,
        name: &str,
        condition: Condition<B>,
    ) -> Result<Self, PinnError> {
        for variable in &self.input_variables {
            if condition.location.range(variable).is_none() {
                return Err(PinnError::MissingVariable {
                    condition: name.to_string(),
                    variable: variable.clone(),
                });
            }
        }
        for variable in condition.location.variables() {
            if !self.input_variables.iter().any(|v| v == variable) {
                return Err(PinnError::UnknownVariable {
                    variable: variable.to_string(),
                });
            }
        }
        self.conditions.insert(name.to_string(), condition);
        Ok(self)
    }

    /// 問題の名前を返します。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 入力変数の並びを返します。
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// 出力変数の並びを返します。
    pub fn output_variables(&self) -> &[String] {
        &self.output_variables
    }

    /// 名前順の条件マップを返します。
    pub fn conditions(&self) -> &BTreeMap<String, Condition<B>> {
        &self.conditions
    }

    /// 条件名を名前順で返します（報告用）。
    pub fn condition_names(&self) -> Vec<String> {
        self.conditions.keys().cloned().collect()
    }

    /// 全条件の点群をサンプリングします。
    ///
    /// 点群は呼び出しのたびに再生成され、問題側には保持されません。
    pub fn sample<R: Rng>(
        &self,
        n: usize,
        mode: SampleMode,
        rng: &mut R,
    ) -> Result<BTreeMap<String, SampledPoints>, PinnError> {
        let mut points = BTreeMap::new();
        for (name, condition) in &self.conditions {
            let sampled = condition
                .location
                .sample(n, mode, &self.input_variables, rng)?;
            points.insert(name.clone(), sampled);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn zero_residual<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
        sample.output(0)
    }

    #[test]
    fn condition_order_is_alphabetical_regardless_of_insertion() {
        let problem = Problem::<TestBackend>::new("test", &["x"], &["u"])
            .add_condition(
                "gamma",
                Condition::new(Span::new().interval("x", 0.0, 1.0), zero_residual),
            )
            .unwrap()
            .add_condition(
                "alpha",
                Condition::new(Span::new().fixed("x", 0.0), zero_residual),
            )
            .unwrap();
        assert_eq!(problem.condition_names(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn condition_span_must_cover_every_input_variable() {
        let err = Problem::<TestBackend>::new("test", &["t", "x"], &["u"])
            .add_condition(
                "partial",
                Condition::new(Span::new().interval("x", 0.0, 1.0), zero_residual),
            )
            .unwrap_err();
        assert_eq!(
            err,
            PinnError::MissingVariable {
                condition: "partial".to_string(),
                variable: "t".to_string()
            }
        );
    }

    #[test]
    fn condition_span_may_not_introduce_undeclared_variables() {
        let err = Problem::<TestBackend>::new("test", &["x"], &["u"])
            .add_condition(
                "extra",
                Condition::new(
                    Span::new().interval("x", 0.0, 1.0).interval("y", 0.0, 1.0),
                    zero_residual,
                ),
            )
            .unwrap_err();
        assert_eq!(
            err,
            PinnError::UnknownVariable {
                variable: "y".to_string()
            }
        );
    }

    #[test]
    fn a_condition_may_hold_several_residual_functions() {
        fn first<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
            sample.output(0)
        }
        fn second<B: AutodiffBackend>(sample: &FieldSample<B>) -> Tensor<B, 2> {
            sample.partial(0, 0)
        }
        let condition = Condition::<TestBackend>::with_residuals(
            Span::new().interval("x", 0.0, 1.0),
            vec![first, second],
        );
        assert_eq!(condition.residuals().len(), 2);
    }

    #[test]
    fn sample_generates_one_point_set_per_condition() {
        let problem = Problem::<TestBackend>::new("test", &["x"], &["u"])
            .add_condition(
                "boundary",
                Condition::new(Span::new().fixed("x", 0.0), zero_residual),
            )
            .unwrap()
            .add_condition(
                "interior",
                Condition::new(Span::new().interval("x", 0.0, 1.0), zero_residual),
            )
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let points = problem.sample(8, SampleMode::Random, &mut rng).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points["boundary"].len(), 8);
        assert_eq!(points["interior"].len(), 8);
    }
}

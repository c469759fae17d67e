use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Tanh};
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// フィードフォワードネットワークの構成。
#[derive(Debug, Clone, Copy)]
pub struct FeedForwardConfig {
    /// 入力変数の数
    pub n_input: usize,
    /// 出力変数の数
    pub n_output: usize,
    /// 隠れ層のユニット数
    pub n_hidden: usize,
    /// 層数（入出力層を含む）
    pub n_layers: usize,
}

impl FeedForwardConfig {
    /// 既定のユニット数・層数で構成を作成します。
    pub fn new(n_input: usize, n_output: usize) -> Self {
        Self {
            n_input,
            n_output,
            n_hidden: 20,
            n_layers: 4,
        }
    }

    /// 隠れ層のユニット数を指定します。
    pub fn with_hidden(mut self, n_hidden: usize) -> Self {
        self.n_hidden = n_hidden;
        self
    }

    /// 層数を指定します。
    pub fn with_layers(mut self, n_layers: usize) -> Self {
        self.n_layers = n_layers;
        self
    }
}

/// PINNの本体となるニューラルネットワークモデル。
///
/// 入力座標を受け取り、各点における出力変数の予測値を返す
/// 多層パーセプトロン（MLP）です。
#[derive(Module, Debug)]
pub struct FeedForward<B: Backend> {
    linears: Vec<Linear<B>>,
    activation: Tanh,
}

impl<B: Backend> FeedForward<B> {
    /// 新しいモデルを初期化します。
    pub fn new(config: &FeedForwardConfig, device: &B::Device) -> Self {
        let mut linears = Vec::new();
        linears.push(LinearConfig::new(config.n_input, config.n_hidden).init(device));
        for _ in 1..(config.n_layers - 1) {
            linears.push(LinearConfig::new(config.n_hidden, config.n_hidden).init(device));
        }
        linears.push(LinearConfig::new(config.n_hidden, config.n_output).init(device));
        Self {
            linears,
            activation: Tanh::new(),
        }
    }

    /// モデルの順伝播を実行します。
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for i in 0..(self.linears.len() - 1) {
            x = self.linears[i].forward(x);
            x = self.activation.forward(x);
        }
        self.linears
            .last()
            .expect("FeedForwardは最低1層を持ちます")
            .forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_maps_input_width_to_output_width() {
        let device = Default::default();
        let config = FeedForwardConfig::new(2, 3).with_hidden(8).with_layers(3);
        let model = FeedForward::<TestBackend>::new(&config, &device);
        let input =
            Tensor::<TestBackend, 2>::random([10, 2], Distribution::Uniform(-1.0, 1.0), &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [10, 3]);
    }

    #[test]
    fn default_config_matches_reference_architecture() {
        let config = FeedForwardConfig::new(2, 1);
        assert_eq!(config.n_hidden, 20);
        assert_eq!(config.n_layers, 4);
    }
}

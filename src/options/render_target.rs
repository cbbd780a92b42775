use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Anti-aliasing strategy for the off-screen scene target.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AntialiasingMode {
    /// Single-sample framebuffer.
    None,
    /// Multisampled color/depth resolved on blit.
    #[default]
    Msaa,
    /// Render at a multiple of the output size and filter down.
    Ssaa,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Render Target", inline)]
#[serde(default)]
/// Off-screen render target parameters.
pub struct RenderTargetOptions {
    /// Anti-aliasing strategy.
    #[schemars(title = "Anti-aliasing")]
    pub antialiasing: AntialiasingMode,
    /// Sample count used in MSAA mode. Must be above 1; use
    /// [`AntialiasingMode::None`] for a single-sample target.
    #[schemars(title = "MSAA Samples", range(min = 2, max = 4))]
    pub msaa_samples: u32,
    /// Scale factor used in SSAA mode.
    #[schemars(title = "SSAA Factor", range(min = 1, max = 4))]
    pub ssaa_factor: u32,
    /// Clear color (linear RGBA).
    #[schemars(skip)]
    pub clear_color: [f32; 4],
}

impl Default for RenderTargetOptions {
    fn default() -> Self {
        Self {
            antialiasing: AntialiasingMode::Msaa,
            msaa_samples: 4,
            ssaa_factor: 2,
            clear_color: [0.05, 0.05, 0.08, 1.0],
        }
    }
}

impl RenderTargetOptions {
    /// Clear color as a wgpu color.
    pub fn clear(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: f64::from(a),
        }
    }
}

mod adam;
mod gradient_descent;
mod optimizer;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use optimizer::Optimizer;

use crate::{MlErr, Result};

fn check_lengths(params: &[f32], other: &[f32]) -> Result<()> {
    if params.len() != other.len() {
        return Err(MlErr::SizeMismatch {
            a: "params",
            b: "optimizer input",
            got: other.len(),
            expected: params.len(),
        });
    }

    Ok(())
}

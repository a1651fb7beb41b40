use crate::error::DomainError;
use crate::float_trait::Float;
use crate::images::{BoundaryContours, ImagePosition};
use crate::trajectory::SourcePosition;

use itertools::Itertools;
use macro_const::macro_const;

macro_const! {
    const DOC: &str = r#"
Point-source point-lens magnification

$$
A(y) = F_0 \frac{y^2 + 2}{y \sqrt{y^2 + 4}},
$$

where $y$ is the source-lens separation in Einstein radii and $F_0$ is the baseline flux. $A$ is
strictly decreasing for $y > 0$, diverges as $y \to 0^+$ and approaches $F_0$ as $y \to \infty$.
The source on the lens axis, $y = 0$, is reported as [DomainError], as well as separations so
small that the magnification overflows.

It is evaluated as $F_0 (y + 2 / y) / \sqrt{y^2 + 4}$ with `hypot`, so large separations don't
overflow.
"#;
}

#[doc = DOC!()]
pub fn magnification<T>(position: &SourcePosition<T>, baseline_flux: T) -> Result<T, DomainError>
where
    T: Float,
{
    let y = position.separation();
    if y.is_zero() {
        return Err(DomainError::source_on_lens_axis(position.y1, position.y2));
    }
    let a = magnification_at_separation(y, baseline_flux);
    if !a.is_finite() {
        return Err(DomainError::not_representable(
            "magnification",
            position.y1,
            position.y2,
        ));
    }
    Ok(a)
}

/// Magnification as a function of separation, `y` must be positive
///
/// Gives infinity when $2 / y$ overflows, [magnification] reports it as an error.
#[inline]
pub fn magnification_at_separation<T>(y: T, baseline_flux: T) -> T
where
    T: Float,
{
    baseline_flux * (y + T::two() / y) / y.hypot(T::two())
}

/// Area enclosed by a closed polygon, orientation is ignored
///
/// Vertices are taken relative to the first one, so contours far from the origin don't overflow.
pub fn contour_area<T>(contour: &[ImagePosition<T>]) -> T
where
    T: Float,
{
    let Some(origin) = contour.first() else {
        return T::zero();
    };
    if contour.len() < 3 {
        return T::zero();
    }
    let doubled: T = contour
        .iter()
        .map(|x| ImagePosition::new(x.x1 - origin.x1, x.x2 - origin.x2))
        .circular_tuple_windows()
        .map(|(a, b)| a.x1 * b.x2 - b.x1 * a.x2)
        .sum();
    T::half() * doubled.abs()
}

/// Magnification of a uniform disk from its sampled image contours
///
/// Surface brightness is conserved by lensing, so the magnification of a uniform source equals the
/// ratio of the total image area to the source area. Areas are polygon areas of the sampled
/// contours, so the accuracy is limited by the boundary resolution. Defined only if the disk does
/// not cover the lens: otherwise the images merge into a ring and the contours no longer bound them,
/// `None` is returned. `None` is also returned if the areas are not representable.
pub fn contour_magnification<T>(
    contours: &BoundaryContours<T>,
    center: &SourcePosition<T>,
    radius: T,
    baseline_flux: T,
) -> Option<T>
where
    T: Float,
{
    if center.separation() <= radius {
        return None;
    }
    let source_area = T::PI() * radius.powi(2);
    let image_area = contour_area(&contours.plus) + contour_area(&contours.minus);
    let a = baseline_flux * image_area / source_area;
    a.is_finite().then_some(a)
}

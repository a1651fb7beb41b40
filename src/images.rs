use crate::error::{ConfigurationError, DomainError, SimulationError};
use crate::float_trait::Float;
use crate::trajectory::SourcePosition;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Lensed image position in Einstein radii
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct ImagePosition<T> {
    pub x1: T,
    pub x2: T,
}

impl<T> ImagePosition<T>
where
    T: Float,
{
    pub fn new(x1: T, x2: T) -> Self {
        Self { x1, x2 }
    }

    #[inline]
    pub fn norm(&self) -> T {
        self.x1.hypot(self.x2)
    }
}

/// Which of the two point-lens images
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    /// Major image, outside the Einstein ring, same side as the source
    Plus,
    /// Minor image, inside the Einstein ring, opposite side
    Minus,
}

impl ImageKind {
    pub const BOTH: [Self; 2] = [Self::Plus, Self::Minus];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
        }
    }
}

/// Both images of a point source
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct ImagePair<T> {
    pub plus: ImagePosition<T>,
    pub minus: ImagePosition<T>,
}

impl<T> ImagePair<T> {
    pub fn get(&self, kind: ImageKind) -> &ImagePosition<T> {
        match kind {
            ImageKind::Plus => &self.plus,
            ImageKind::Minus => &self.minus,
        }
    }
}

/// Both images of a point source
///
/// Images lie on the line through the lens and the source: $x_\pm = \frac{1}{2}(1 \pm Q) y$,
/// $Q = \sqrt{y^2 + 4} / y$. A source exactly on the lens axis has no image pair, it produces an
/// Einstein ring.
///
/// The major image is evaluated as $|x_+| = \frac{1}{2}(r + \sqrt{r^2 + 4})$ along the unit vector
/// $y / r$ and the minor image from $|x_+| |x_-| = 1$, so neither overflows nor cancels for very
/// large or very small separations $r$.
pub fn point_images<T>(position: &SourcePosition<T>) -> Result<ImagePair<T>, DomainError>
where
    T: Float,
{
    let SourcePosition { y1, y2 } = *position;
    let r = position.separation();
    if r.is_zero() {
        return Err(DomainError::source_on_lens_axis(y1, y2));
    }
    let (u1, u2) = (y1 / r, y2 / r);
    let plus_norm = T::half() * r + T::half() * r.hypot(T::two());
    let pair = ImagePair {
        plus: ImagePosition::new(plus_norm * u1, plus_norm * u2),
        minus: ImagePosition::new(-u1 / plus_norm, -u2 / plus_norm),
    };
    let finite = [pair.plus.x1, pair.plus.x2, pair.minus.x1, pair.minus.x2]
        .iter()
        .all(|x| x.is_finite());
    if !finite {
        return Err(DomainError::not_representable("image position", y1, y2));
    }
    Ok(pair)
}

/// One image of a point source
pub fn point_image<T>(
    position: &SourcePosition<T>,
    kind: ImageKind,
) -> Result<ImagePosition<T>, DomainError>
where
    T: Float,
{
    point_images(position).map(|pair| *pair.get(kind))
}

/// Polar angles of `resolution` equally spaced points on [0, 2π)
pub fn boundary_angles<T>(resolution: usize) -> Array1<T>
where
    T: Float,
{
    let n = T::from_double(resolution as f64);
    Array1::from_iter((0..resolution).map(|i| T::TAU() * T::from_double(i as f64) / n))
}

/// Image contour of a uniform circular source
///
/// The source disk boundary is sampled at `resolution` polar angles, every boundary point is mapped
/// with [point_image]. This traces the distorted image outline only, the disk interior is not
/// integrated.
pub fn finite_source_boundary_images<T>(
    center: &SourcePosition<T>,
    radius: T,
    kind: ImageKind,
    resolution: usize,
) -> Result<Vec<ImagePosition<T>>, DomainError>
where
    T: Float,
{
    boundary_angles::<T>(resolution)
        .iter()
        .map(|&phi| point_image(&center.offset(radius, phi), kind))
        .collect()
}

/// Plus and minus image contours of a circular source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct BoundaryContours<T> {
    pub plus: Vec<ImagePosition<T>>,
    pub minus: Vec<ImagePosition<T>>,
}

impl<T> BoundaryContours<T>
where
    T: Float,
{
    /// Sample both contours, `radius` must be positive and `resolution` at least three
    pub fn new(
        center: &SourcePosition<T>,
        radius: T,
        resolution: usize,
    ) -> Result<Self, SimulationError> {
        ConfigurationError::check_positive("source radius", radius.into_double())?;
        ConfigurationError::check_size("boundary resolution", resolution, 3)?;
        let mut plus = Vec::with_capacity(resolution);
        let mut minus = Vec::with_capacity(resolution);
        for phi in boundary_angles::<T>(resolution) {
            let pair = point_images(&center.offset(radius, phi))?;
            plus.push(pair.plus);
            minus.push(pair.minus);
        }
        Ok(Self { plus, minus })
    }

    pub fn get(&self, kind: ImageKind) -> &[ImagePosition<T>] {
        match kind {
            ImageKind::Plus => &self.plus,
            ImageKind::Minus => &self.minus,
        }
    }
}

use crate::{
    height_field::{HeightField, HeightFieldError},
    Scalar,
};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

const HASH_SEED: u32 = 0xdead_beef;

#[inline]
fn final_mix(mut a: u32, mut b: u32, mut c: u32) -> u32 {
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(14));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(11));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(25));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(16));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(4));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(14));
    c ^= b;
    c.wrapping_sub(b.rotate_left(24))
}

#[inline]
fn initial_state(words: u32) -> u32 {
    HASH_SEED.wrapping_add(words << 2).wrapping_add(13)
}

/// Jenkins lookup3 hash of single integer.
pub fn hash_uint(kx: u32) -> u32 {
    let init = initial_state(1);
    final_mix(init.wrapping_add(kx), init, init)
}

/// Jenkins lookup3 hash of two integers.
pub fn hash_uint2(kx: u32, ky: u32) -> u32 {
    let init = initial_state(2);
    final_mix(init.wrapping_add(kx), init.wrapping_add(ky), init)
}

/// Jenkins lookup3 hash of three integers.
pub fn hash_uint3(kx: u32, ky: u32, kz: u32) -> u32 {
    let init = initial_state(3);
    final_mix(
        init.wrapping_add(kx),
        init.wrapping_add(ky),
        init.wrapping_add(kz),
    )
}

/// Map hash into `[0, 1]` (both inclusive).
#[inline]
pub fn uint_to_float(n: u32) -> Scalar {
    n as Scalar * (1.0 / u32::MAX as Scalar)
}

/// Feature point offset of cellular noise cell, both coordinates in `[0, 1]`.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let a = cell_jitter(3, -2);
/// assert_eq!(a, cell_jitter(3, -2));
/// assert!(a.0 >= 0.0 && a.0 <= 1.0);
/// assert!(a.1 >= 0.0 && a.1 <= 1.0);
/// ```
pub fn cell_jitter(x: i32, y: i32) -> (Scalar, Scalar) {
    let (x, y) = (x as u32, y as u32);
    (
        uint_to_float(hash_uint2(x, y)),
        uint_to_float(hash_uint3(x, y, 1)),
    )
}

/// Cellular noise value: distance to the nearest jittered feature point of the neighbouring
/// cells.
pub fn voronoi_value(u: Scalar, v: Scalar) -> Scalar {
    let cell_x = u.floor() as i32;
    let cell_y = v.floor() as i32;
    let mut result = Scalar::INFINITY;
    for dx in -1..=1 {
        for dy in -1..=1 {
            let (x, y) = (cell_x.wrapping_add(dx), cell_y.wrapping_add(dy));
            let (jx, jy) = cell_jitter(x, y);
            let fx = x as Scalar + jx - u;
            let fy = y as Scalar + jy - v;
            result = result.min(fx * fx + fy * fy);
        }
    }
    result.sqrt()
}

#[inline]
fn sample_coordinate(index: usize, size: usize, scale: Scalar) -> Scalar {
    if size > 1 {
        index as Scalar / (size - 1) as Scalar * scale
    } else {
        0.0
    }
}

/// Blend fractal Perlin noise into height field.
///
/// # Arguments
/// * `field` - Height field.
/// * `alpha` - Noise weight.
/// * `scale` - Noise scale over whole field.
/// * `octaves` - Number of octaves.
/// * `seed` - Noise seed.
pub fn add_perlin(field: &mut HeightField, alpha: Scalar, scale: Scalar, octaves: usize, seed: u32) {
    let fbm = Fbm::<Perlin>::new(seed)
        .set_octaves(octaves)
        .set_frequency(1.0)
        .set_lacunarity(2.0)
        .set_persistence(0.5);
    let (width, height) = (field.width(), field.height());
    field.blend(alpha, |col, row| {
        let u = sample_coordinate(col, width, scale);
        let v = sample_coordinate(row, height, scale);
        fbm.get([u as f64, v as f64, 0.0]) as Scalar
    });
    log::debug!(
        "Added perlin noise to {}x{} height field (weight: {}, scale: {}, octaves: {})",
        width,
        height,
        alpha,
        scale,
        octaves
    );
}

/// Blend cellular (Voronoi) noise into height field.
///
/// # Arguments
/// * `field` - Height field.
/// * `alpha` - Noise weight.
/// * `scale` - Number of cells across the field.
pub fn add_voronoi(field: &mut HeightField, alpha: Scalar, scale: Scalar) {
    let (width, height) = (field.width(), field.height());
    field.blend(alpha, |col, row| {
        voronoi_value(
            sample_coordinate(col, width, scale),
            sample_coordinate(row, height, scale),
        )
    });
    log::debug!(
        "Added voronoi noise to {}x{} height field (weight: {}, scale: {})",
        width,
        height,
        alpha,
        scale
    );
}

/// Create height field of fractal Perlin noise.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let a = perlin(16, 16, 4.0, 3, 7).unwrap();
/// let b = perlin(16, 16, 4.0, 3, 7).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn perlin(
    width: usize,
    height: usize,
    scale: Scalar,
    octaves: usize,
    seed: u32,
) -> Result<HeightField, HeightFieldError> {
    let mut field = HeightField::new(width, height)?;
    add_perlin(&mut field, 1.0, scale, octaves, seed);
    Ok(field)
}

/// Create height field of cellular noise.
pub fn voronoi(width: usize, height: usize, scale: Scalar) -> Result<HeightField, HeightFieldError> {
    let mut field = HeightField::new(width, height)?;
    add_voronoi(&mut field, 1.0, scale);
    Ok(field)
}

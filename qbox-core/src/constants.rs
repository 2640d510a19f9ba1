//! Angular constants shared across the workspace.

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const QUARTER_PI: f64 = 0.7853981633974483096156608;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Square degrees per steradian, (180/pi)^2.
#[allow(clippy::excessive_precision)]
pub const DEG2_PER_STERADIAN: f64 = 3282.806350011743794781695;

/// Area of the full sphere in square degrees, 4*pi*(180/pi)^2.
#[allow(clippy::excessive_precision)]
pub const SPHERE_AREA_DEG2: f64 = 41252.96124941927692986383;

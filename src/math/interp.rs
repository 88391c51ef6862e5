use glam::Vec3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpRange<T> {
	pub beg: T,
	pub end: T,
}

impl<T> InterpRange<T> {
	#[inline]
	pub fn new(beg: T, end: T) -> Self {
		Self { beg, end }
	}
}

impl InterpRange<f32> {
	#[inline]
	pub fn len(&self) -> f32 {
		self.end - self.beg
	}

	/// Normalized position of `t` inside the range, clamped to `[0, 1]`.
	///
	/// An empty or inverted range is a step: 0 before `beg`, 1 from `beg` on.
	#[inline]
	pub fn progress_of(&self, t: f32) -> f32 {
		if self.len() <= 0.0 {
			return if t < self.beg { 0.0 } else { 1.0 };
		}
		((t - self.beg) / self.len()).clamp(0.0, 1.0)
	}
}

#[inline]
pub fn interpolate_f32(t: f32, range_out: InterpRange<f32>) -> f32 {
	range_out.beg + (range_out.end - range_out.beg) * t
}

#[inline]
pub fn interpolate_vec3(t: f32, range_out: InterpRange<Vec3>) -> Vec3 {
	range_out.beg.lerp(range_out.end, t)
}

//! Easing curves, named the way web animation libraries name them (`"power2.inOut"`, `"back.out(1.7)"`).

use std::f32::consts::PI;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseDir {
	In,
	Out,
	InOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
	Linear,
	/// `power1` is quadratic, `power2` cubic, and so on.
	Power {
		order: u8,
		dir: EaseDir,
	},
	Sine(EaseDir),
	Back {
		overshoot: f32,
		dir: EaseDir,
	},
}

impl Default for Ease {
	fn default() -> Self {
		Ease::Power {
			order: 1,
			dir: EaseDir::Out,
		}
	}
}

impl Ease {
	pub fn apply(self, t: f32) -> f32 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Ease::Linear => t,
			Ease::Power { order, dir } => {
				let exp = i32::from(order) + 1;
				directed(dir, t, |t| t.powi(exp))
			}
			Ease::Sine(dir) => directed(dir, t, |t| 1.0 - (t * PI / 2.0).cos()),
			Ease::Back { overshoot, dir } => directed(dir, t, |t| t * t * ((overshoot + 1.0) * t - overshoot)),
		}
	}
}

/// Builds the out and in-out variants from an ease-in curve.
#[inline]
fn directed(dir: EaseDir, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
	match dir {
		EaseDir::In => ease_in(t),
		EaseDir::Out => 1.0 - ease_in(1.0 - t),
		EaseDir::InOut => {
			if t < 0.5 {
				ease_in(2.0 * t) / 2.0
			} else {
				1.0 - ease_in(2.0 * (1.0 - t)) / 2.0
			}
		}
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown ease {0:?}")]
pub struct UnknownEaseError(String);

impl FromStr for Ease {
	type Err = UnknownEaseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let unknown = || UnknownEaseError(s.to_owned());
		let s = s.trim();
		if s == "none" || s == "linear" {
			return Ok(Ease::Linear);
		}

		let (family, rest) = s.split_once('.').unwrap_or((s, "out"));
		let (dir, arg) = match rest.split_once('(') {
			Some((dir, arg)) => (dir, Some(arg.strip_suffix(')').ok_or_else(unknown)?)),
			None => (rest, None),
		};
		let dir = match dir {
			"in" => EaseDir::In,
			"out" => EaseDir::Out,
			"inOut" => EaseDir::InOut,
			_ => return Err(unknown()),
		};

		match (family, arg) {
			("sine", None) => Ok(Ease::Sine(dir)),
			("back", arg) => {
				let overshoot = match arg {
					Some(arg) => arg.trim().parse().map_err(|_| unknown())?,
					None => 1.70158,
				};
				Ok(Ease::Back { overshoot, dir })
			}
			(family, None) => match family.strip_prefix("power").map(str::parse::<u8>) {
				Some(Ok(0)) => Ok(Ease::Linear),
				Some(Ok(order)) if order <= 4 => Ok(Ease::Power { order, dir }),
				_ => Err(unknown()),
			},
			_ => Err(unknown()),
		}
	}
}

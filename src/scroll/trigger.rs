use std::fmt;
use std::str::FromStr;

use crate::host::RegionBounds;
use crate::math::interp::InterpRange;

/// A distance along the element or along the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
	/// Fraction of the element height or viewport height (`top` = 0, `bottom` = 1).
	Fraction(f32),
	Pixels(f32),
}

impl Offset {
	#[inline]
	fn resolve(self, size: f32) -> f32 {
		match self {
			Offset::Fraction(fraction) => fraction * size,
			Offset::Pixels(px) => px,
		}
	}
}

/// Where a region starts or ends: "when `element` line of the region meets `viewport` line of the screen".
///
/// Parsed from strings like `"top 80%"`, `"bottom bottom"` or `"center 100px"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPoint {
	pub element: Offset,
	pub viewport: Offset,
}

impl TriggerPoint {
	pub const fn new(element: Offset, viewport: Offset) -> Self {
		Self { element, viewport }
	}

	/// Document scroll offset at which this point is reached.
	pub fn scroll_offset(&self, bounds: RegionBounds, viewport_height: f32) -> f32 {
		bounds.top + self.element.resolve(bounds.height) - self.viewport.resolve(viewport_height)
	}
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TriggerPointError {
	#[error("Expected \"<element> <viewport>\", got {0:?}")]
	Malformed(String),
	#[error("Unknown offset {0:?}")]
	UnknownOffset(String),
}

fn parse_offset(token: &str) -> Result<Offset, TriggerPointError> {
	let unknown = || TriggerPointError::UnknownOffset(token.to_owned());
	match token {
		"top" => Ok(Offset::Fraction(0.0)),
		"center" => Ok(Offset::Fraction(0.5)),
		"bottom" => Ok(Offset::Fraction(1.0)),
		_ => {
			if let Some(percent) = token.strip_suffix('%') {
				let percent: f32 = percent.parse().map_err(|_| unknown())?;
				Ok(Offset::Fraction(percent / 100.0))
			} else {
				let px = token.strip_suffix("px").unwrap_or(token);
				px.parse().map(Offset::Pixels).map_err(|_| unknown())
			}
		}
	}
}

impl FromStr for TriggerPoint {
	type Err = TriggerPointError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut tokens = s.split_whitespace();
		match (tokens.next(), tokens.next(), tokens.next()) {
			(Some(element), Some(viewport), None) => Ok(Self::new(parse_offset(element)?, parse_offset(viewport)?)),
			_ => Err(TriggerPointError::Malformed(s.to_owned())),
		}
	}
}

impl fmt::Display for TriggerPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let token = |offset: Offset| match offset {
			Offset::Fraction(fr) if fr == 0.0 => "top".to_owned(),
			Offset::Fraction(fr) if fr == 0.5 => "center".to_owned(),
			Offset::Fraction(fr) if fr == 1.0 => "bottom".to_owned(),
			Offset::Fraction(fr) => format!("{}%", fr * 100.0),
			Offset::Pixels(px) => format!("{px}px"),
		};
		write!(f, "{} {}", token(self.element), token(self.viewport))
	}
}

/// Position of the scroll offset relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
	Before,
	/// Strictly between the start and end offsets.
	Active,
	After,
}

impl RegionState {
	pub fn at(scroll: f32, bounds: InterpRange<f32>) -> Self {
		if bounds.len() <= 0.0 {
			return if scroll < bounds.beg {
				RegionState::Before
			} else {
				RegionState::After
			};
		}

		if scroll <= bounds.beg {
			RegionState::Before
		} else if scroll >= bounds.end {
			RegionState::After
		} else {
			RegionState::Active
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	/// Before -> Active, scrolling down.
	Enter,
	/// Active -> After, scrolling down.
	Leave,
	/// After -> Active, scrolling up.
	EnterBack,
	/// Active -> Before, scrolling up.
	LeaveBack,
}

impl Transition {
	/// Transitions fired when going from `from` to `to`, in order.
	/// Skipping over the whole region fires both halves.
	pub fn between(from: RegionState, to: RegionState) -> &'static [Transition] {
		use RegionState::*;
		use Transition::*;

		match (from, to) {
			(Before, Active) => &[Enter],
			(Active, After) => &[Leave],
			(After, Active) => &[EnterBack],
			(Active, Before) => &[LeaveBack],
			(Before, After) => &[Enter, Leave],
			(After, Before) => &[EnterBack, LeaveBack],
			(Before, Before) | (Active, Active) | (After, After) => &[],
		}
	}

	pub fn is_entering(self) -> bool {
		matches!(self, Transition::Enter | Transition::EnterBack)
	}
}

//! Typed accessors over `json` objects, with errors that remember where they happened.

use glam::Vec3;
use json::JsonValue;

pub type JsonResult<T> = Result<T, JsonError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum JsonError {
	#[error("Key {0:?} does not exist")]
	KeyDoesNotExist(String),
	#[error("Value at {0:?} is not an object")]
	ValueIsNotObject(String),
	#[error("Value at {0:?} is not a list")]
	ValueIsNotList(String),
	#[error("Value at {0:?} is not a string")]
	ValueIsNotString(String),
	#[error("Value at {0:?} is not a number")]
	ValueIsNotNumber(String),
	#[error("Value at {0:?} is not a bool")]
	ValueIsNotBool(String),
	#[error("Error while parsing int at {0:?}\n  - number out of scope")]
	ParseIntError(String),
	#[error("Error while parsing vec3 at {key:?}\n  - {msg}")]
	ParseVec3Error { key: String, msg: String },
	#[error("Error in object at {key:?}\n  - {inner}")]
	ErrorInObject { key: String, inner: Box<JsonError> },
}

impl JsonError {
	pub fn nested(self, key: &str) -> Self {
		Self::ErrorInObject {
			key: key.to_owned(),
			inner: Box::new(self),
		}
	}

	/// Dotted path to the offending value.
	pub fn path(&self) -> String {
		match self {
			JsonError::ErrorInObject { key, inner } => format!("{key}.{}", inner.path()),
			JsonError::KeyDoesNotExist(key)
			| JsonError::ValueIsNotObject(key)
			| JsonError::ValueIsNotList(key)
			| JsonError::ValueIsNotString(key)
			| JsonError::ValueIsNotNumber(key)
			| JsonError::ValueIsNotBool(key)
			| JsonError::ParseIntError(key)
			| JsonError::ParseVec3Error { key, .. } => key.clone(),
		}
	}
}

#[derive(Clone, Copy)]
pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	/// Wraps `value` if it is an object.
	pub fn from_value(value: &'a JsonValue) -> Option<Self> {
		match value {
			JsonValue::Object(obj) => Some(JsonObject(obj)),
			_ => None,
		}
	}

	fn get(&self, key: &str) -> JsonResult<&'a JsonValue> {
		let obj: &'a json::object::Object = self.0;
		match obj.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::KeyDoesNotExist(key.to_owned())),
		}
	}

	pub fn contains(&self, key: &str) -> bool {
		self.0.get(key).is_some()
	}

	/// `None` if the key is absent, otherwise whatever `get` makes of it.
	pub fn get_opt<T>(&self, key: &str, get: impl FnOnce(&Self, &str) -> JsonResult<T>) -> JsonResult<Option<T>> {
		if self.contains(key) {
			get(self, key).map(Some)
		} else {
			Ok(None)
		}
	}

	pub fn get_object(&self, key: &str) -> JsonResult<JsonObject<'a>> {
		match Self::from_value(self.get(key)?) {
			Some(obj) => Ok(obj),
			None => Err(JsonError::ValueIsNotObject(key.to_owned())),
		}
	}

	pub fn get_list(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get(key)? {
			JsonValue::Array(arr) => Ok(arr),
			_ => Err(JsonError::ValueIsNotList(key.to_owned())),
		}
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotString(key.to_owned())),
		}
	}

	fn get_number(&self, key: &str) -> JsonResult<json::number::Number> {
		match self.get(key)?.as_number() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotNumber(key.to_owned())),
		}
	}

	pub fn get_f64(&self, key: &str) -> JsonResult<f64> {
		Ok(self.get_number(key)?.into())
	}

	pub fn get_f32(&self, key: &str) -> JsonResult<f32> {
		Ok(self.get_number(key)?.into())
	}

	pub fn get_u32(&self, key: &str) -> JsonResult<u32> {
		self.get_number(key)?
			.try_into()
			.map_err(|_| JsonError::ParseIntError(key.to_owned()))
	}

	pub fn get_bool(&self, key: &str) -> JsonResult<bool> {
		match self.get(key)?.as_bool() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotBool(key.to_owned())),
		}
	}

	pub fn get_vec3(&self, key: &str) -> JsonResult<Vec3> {
		let list = self.get_list(key)?;
		if list.len() != 3 {
			return Err(JsonError::ParseVec3Error {
				key: key.to_owned(),
				msg: format!("expected list of length 3, but has length {}", list.len()),
			});
		}

		let mut out = [0.0; 3];
		for (slot, value) in out.iter_mut().zip(list) {
			*slot = match value.as_number() {
				Some(val) => val.into(),
				None => {
					return Err(JsonError::ParseVec3Error {
						key: key.to_owned(),
						msg: "expected float, but did not get a number".to_owned(),
					})
				}
			};
		}
		Ok(Vec3::from_array(out))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn typed_getters() {
		let value = json::parse(r#"{ "a": 1.5, "b": [1, 2, 3], "c": "x", "d": true, "e": { "f": 7 } }"#).unwrap();
		let obj = JsonObject::from_value(&value).unwrap();

		assert_eq!(obj.get_f32("a").unwrap(), 1.5);
		assert_eq!(obj.get_vec3("b").unwrap(), Vec3::new(1.0, 2.0, 3.0));
		assert_eq!(obj.get_str("c").unwrap(), "x");
		assert!(obj.get_bool("d").unwrap());
		assert_eq!(obj.get_object("e").unwrap().get_u32("f").unwrap(), 7);
		assert_eq!(obj.get_opt("missing", JsonObject::get_f32).unwrap(), None);
		assert_eq!(obj.get_opt("a", JsonObject::get_f64).unwrap(), Some(1.5));
	}

	#[test]
	fn errors_carry_their_path() {
		let value = json::parse(r#"{ "e": { "f": "seven", "v": [1, 2] } }"#).unwrap();
		let obj = JsonObject::from_value(&value).unwrap();
		let inner = obj.get_object("e").unwrap();

		let err = inner.get_u32("f").unwrap_err().nested("e");
		assert!(matches!(err, JsonError::ErrorInObject { .. }));
		assert_eq!(err.path(), "e.f");
		assert!(matches!(inner.get_vec3("v"), Err(JsonError::ParseVec3Error { .. })));
		assert!(matches!(obj.get_str("e"), Err(JsonError::ValueIsNotString(_))));
	}
}

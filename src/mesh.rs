//! Tessellation of part geometry into indexed triangle meshes.

use std::f32::consts::{PI, TAU};

use glam::{vec3, Vec3};

use crate::node::Geometry;

#[derive(Debug, Clone, Default)]
pub struct Mesh {
	pub positions: Vec<Vec3>,
	pub normals: Vec<Vec3>,
	/// Counter-clockwise triangles
	pub indices: Vec<u16>,
}

impl Mesh {
	fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
		let index = self.positions.len() as u16;
		self.positions.push(position);
		self.normals.push(normal);
		index
	}

	fn push_quad(&mut self, a: u16, b: u16, c: u16, d: u16) {
		self.indices.extend_from_slice(&[a, b, d, b, c, d]);
	}

	pub fn triangle_count(&self) -> usize {
		self.indices.len() / 3
	}
}

pub fn tessellate(geometry: &Geometry) -> Mesh {
	match *geometry {
		Geometry::Cylinder {
			radius_top,
			radius_bottom,
			height,
			radial_segments,
		} => cylinder(radius_top, radius_bottom, height, radial_segments.max(3)),
		Geometry::Torus {
			radius,
			tube,
			radial_segments,
			tubular_segments,
		} => torus(radius, tube, radial_segments.max(3), tubular_segments.max(3)),
		Geometry::Sphere {
			radius,
			width_segments,
			height_segments,
		} => sphere(radius, width_segments.max(3), height_segments.max(2)),
		Geometry::Cuboid { width, height, depth } => cuboid(width, height, depth),
	}
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Mesh {
	let mut mesh = Mesh::default();
	let half = height / 2.0;
	let slope = (radius_bottom - radius_top) / height;

	// side wall, top row then bottom row
	for (radius, y) in [(radius_top, half), (radius_bottom, -half)] {
		for x in 0..=segments {
			let theta = x as f32 / segments as f32 * TAU;
			let (sin, cos) = theta.sin_cos();
			mesh.push_vertex(
				vec3(radius * sin, y, radius * cos),
				vec3(sin, slope, cos).normalize(),
			);
		}
	}
	let row = segments as u16 + 1;
	for x in 0..segments as u16 {
		mesh.push_quad(x, row + x, row + x + 1, x + 1);
	}

	for (radius, y, sign) in [(radius_top, half, 1.0), (radius_bottom, -half, -1.0)] {
		let normal = vec3(0.0, sign, 0.0);
		let center = mesh.push_vertex(vec3(0.0, y, 0.0), normal);
		for x in 0..=segments {
			let theta = x as f32 / segments as f32 * TAU;
			let (sin, cos) = theta.sin_cos();
			mesh.push_vertex(vec3(radius * sin, y, radius * cos), normal);
		}
		for x in 0..segments as u16 {
			let (a, b) = (center + 1 + x, center + 2 + x);
			if sign > 0.0 {
				mesh.indices.extend_from_slice(&[a, b, center]);
			} else {
				mesh.indices.extend_from_slice(&[b, a, center]);
			}
		}
	}

	mesh
}

fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> Mesh {
	let mut mesh = Mesh::default();

	for j in 0..=radial {
		for i in 0..=tubular {
			let u = i as f32 / tubular as f32 * TAU;
			let v = j as f32 / radial as f32 * TAU;
			let position = vec3(
				(radius + tube * v.cos()) * u.cos(),
				(radius + tube * v.cos()) * u.sin(),
				tube * v.sin(),
			);
			let center = vec3(radius * u.cos(), radius * u.sin(), 0.0);
			mesh.push_vertex(position, (position - center).normalize());
		}
	}

	let row = tubular as u16 + 1;
	for j in 1..=radial as u16 {
		for i in 1..=tubular as u16 {
			mesh.push_quad(row * j + i - 1, row * (j - 1) + i - 1, row * (j - 1) + i, row * j + i);
		}
	}

	mesh
}

fn sphere(radius: f32, width: u32, height: u32) -> Mesh {
	let mut mesh = Mesh::default();

	for iy in 0..=height {
		let v = iy as f32 / height as f32;
		for ix in 0..=width {
			let u = ix as f32 / width as f32;
			let normal = vec3(
				-(u * TAU).cos() * (v * PI).sin(),
				(v * PI).cos(),
				(u * TAU).sin() * (v * PI).sin(),
			);
			mesh.push_vertex(normal * radius, normal);
		}
	}

	let row = width as u16 + 1;
	for iy in 0..height as u16 {
		for ix in 0..width as u16 {
			let a = row * iy + ix + 1;
			let b = row * iy + ix;
			let c = row * (iy + 1) + ix;
			let d = row * (iy + 1) + ix + 1;
			// the poles collapse into single triangles
			if iy != 0 {
				mesh.indices.extend_from_slice(&[a, b, d]);
			}
			if iy != height as u16 - 1 {
				mesh.indices.extend_from_slice(&[b, c, d]);
			}
		}
	}

	mesh
}

fn cuboid(width: f32, height: f32, depth: f32) -> Mesh {
	let mut mesh = Mesh::default();
	let half = vec3(width, height, depth) / 2.0;

	// (normal, u axis, v axis) per face
	let faces = [
		(Vec3::X, Vec3::NEG_Z, Vec3::Y),
		(Vec3::NEG_X, Vec3::Z, Vec3::Y),
		(Vec3::Y, Vec3::X, Vec3::NEG_Z),
		(Vec3::NEG_Y, Vec3::X, Vec3::Z),
		(Vec3::Z, Vec3::X, Vec3::Y),
		(Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
	];

	for (normal, u, v) in faces {
		let center = normal * half;
		let (u, v) = (u * half, v * half);
		let a = mesh.push_vertex(center - u - v, normal);
		let b = mesh.push_vertex(center + u - v, normal);
		let c = mesh.push_vertex(center + u + v, normal);
		let d = mesh.push_vertex(center - u + v, normal);
		mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
	}

	mesh
}

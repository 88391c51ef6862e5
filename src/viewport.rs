//! Keeps the drawing surface and the camera in step with the window.

use tracing::{debug, info, warn};

use crate::host::{SurfaceBackend, SurfaceId, ViewportSize};
use crate::math::camera::PerspectiveCamera;

#[derive(Debug, thiserror::Error)]
pub enum ViewportError<E: std::error::Error + 'static> {
	#[error("Could not create the drawing surface: {0}")]
	Create(#[source] E),
	#[error("Could not attach the drawing surface to {container:?}: {source}")]
	Attach { container: String, source: E },
}

/// A drawing surface attached to its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
	pub id: SurfaceId,
	pub container: String,
	pub size: ViewportSize,
}

/// Creates a surface of `size` and puts it into `container`.
///
/// A surface that was created but could not be attached is released again.
pub fn mount<B: SurfaceBackend + ?Sized>(
	backend: &mut B,
	container: &str,
	size: ViewportSize,
) -> Result<Surface, ViewportError<B::Error>> {
	let id = backend.create_surface(size).map_err(ViewportError::Create)?;
	if let Err(source) = backend.attach_surface(id, container) {
		backend.release_surface(id);
		return Err(ViewportError::Attach {
			container: container.to_owned(),
			source,
		});
	}
	info!("Mounted {} surface in {:?}", size, container);
	Ok(Surface {
		id,
		container: container.to_owned(),
		size,
	})
}

/// Matches the camera aspect and the surface size to the window.
///
/// Returns false and changes nothing for an empty window, which some hosts report while minimized.
pub fn resize<B: SurfaceBackend + ?Sized>(
	backend: &mut B,
	surface: &mut Surface,
	camera: &mut PerspectiveCamera,
	size: ViewportSize,
) -> bool {
	if size.is_empty() {
		warn!("Ignoring resize to {}", size);
		return false;
	}
	camera.set_aspect(size.aspect());
	backend.resize_surface(surface.id, size);
	surface.size = size;
	debug!("Resized surface to {}", size);
	true
}

/// Frees the surface's resources, then takes it out of its container.
pub fn unmount<B: SurfaceBackend + ?Sized>(backend: &mut B, surface: &Surface) {
	release(backend, surface);
	detach(backend, surface);
}

pub(crate) fn release<B: SurfaceBackend + ?Sized>(backend: &mut B, surface: &Surface) {
	backend.release_surface(surface.id);
}

pub(crate) fn detach<B: SurfaceBackend + ?Sized>(backend: &mut B, surface: &Surface) {
	backend.detach_surface(surface.id);
	info!("Unmounted surface from {:?}", surface.container);
}

#[cfg(test)]
mod tests {
	use crate::host::simulated::{HostCall, SimulatedHost, SimulatedHostError};

	use super::*;

	#[test]
	fn resize_updates_aspect_and_surface() {
		let mut host = SimulatedHost::new(ViewportSize::new(800, 600));
		let mut surface = mount(&mut host, "cap-scene", ViewportSize::new(800, 600)).unwrap();
		let mut camera = PerspectiveCamera::default();

		assert!(resize(&mut host, &mut surface, &mut camera, ViewportSize::new(1920, 1080)));
		assert_eq!(camera.aspect, 1920.0 / 1080.0);
		assert_eq!(surface.size, ViewportSize::new(1920, 1080));
		assert_eq!(host.surface(surface.id).unwrap().size, ViewportSize::new(1920, 1080));

		assert!(!resize(&mut host, &mut surface, &mut camera, ViewportSize::new(0, 1080)));
		assert_eq!(camera.aspect, 1920.0 / 1080.0);
	}

	#[test]
	fn failed_attach_releases_surface() {
		let mut host = SimulatedHost::new(ViewportSize::new(800, 600));
		let err = mount(&mut host, "missing", ViewportSize::new(800, 600)).unwrap_err();
		assert!(matches!(
			err,
			ViewportError::Attach {
				source: SimulatedHostError::MissingContainer(_),
				..
			}
		));
		assert_eq!(host.live_surface_count(), 0);
	}

	#[test]
	fn unmount_releases_then_detaches() {
		let mut host = SimulatedHost::new(ViewportSize::new(800, 600));
		let surface = mount(&mut host, "cap-scene", ViewportSize::new(800, 600)).unwrap();
		unmount(&mut host, &surface);

		assert_eq!(host.live_surface_count(), 0);
		assert_eq!(
			&host.calls()[host.calls().len() - 2..],
			[HostCall::ReleaseSurface(surface.id), HostCall::DetachSurface(surface.id)]
		);
	}
}

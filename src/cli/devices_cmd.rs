//! Devices command handler

use crate::application::ports::AcquisitionError;
use crate::infrastructure::microphone::{list_input_devices, InputDevice};

use super::presenter::Presenter;

/// List input devices, marking the default one
pub async fn handle_devices_command(presenter: &Presenter) -> Result<(), AcquisitionError> {
    // Host enumeration blocks on some backends
    let devices = tokio::task::spawn_blocking(list_input_devices)
        .await
        .map_err(|e| AcquisitionError::Failed(format!("Task join error: {}", e)))??;

    if devices.is_empty() {
        presenter.warn("No audio input devices found");
        return Ok(());
    }

    for device in &devices {
        presenter.output(&format_device(device));
    }
    Ok(())
}

fn format_device(device: &InputDevice) -> String {
    if device.is_default {
        format!("* {} (default)", device.name)
    } else {
        format!("  {}", device.name)
    }
}

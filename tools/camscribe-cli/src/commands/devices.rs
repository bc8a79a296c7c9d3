//! List candidate webcam devices.

use camscribe_capture_engine::pipeline::list_webcam_devices;

pub fn run() -> anyhow::Result<()> {
    let devices = list_webcam_devices();
    if devices.is_empty() {
        println!("No webcam devices found under /dev/video*.");
        return Ok(());
    }

    println!("Webcam devices (best candidate first):");
    for device in devices {
        println!(
            "  {}  {}  (priority: {})",
            device.path,
            if device.name.is_empty() {
                "<unnamed>"
            } else {
                device.name.as_str()
            },
            device.priority
        );
    }

    Ok(())
}

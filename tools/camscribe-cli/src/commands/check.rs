//! Check system capabilities.

use camscribe_capture_engine::pipeline::list_webcam_devices;

/// GStreamer elements the composite pipeline needs.
const REQUIRED_ELEMENTS: &[&str] = &[
    "v4l2src",
    "pulsesrc",
    "videoconvert",
    "videoscale",
    "videorate",
    "textoverlay",
    "vp8enc",
    "opusenc",
    "webmmux",
    "appsink",
];

pub fn run() -> anyhow::Result<()> {
    println!("CamScribe System Check");
    println!("{}", "=".repeat(50));

    gstreamer::init()?;

    let mut missing = Vec::new();
    for &element in REQUIRED_ELEMENTS {
        if gstreamer::ElementFactory::find(element).is_some() {
            println!("[OK] GStreamer element: {element}");
        } else {
            println!("[MISSING] GStreamer element: {element}");
            missing.push(element);
        }
    }

    println!();
    let devices = list_webcam_devices();
    if devices.is_empty() {
        println!("[WARN] No webcam devices found under /dev/video*");
    } else {
        println!("[OK] Webcam devices detected: {}", devices.len());
        for device in &devices {
            println!(
                "     {} {} (priority: {})",
                device.path,
                if device.name.is_empty() {
                    "<unnamed>"
                } else {
                    device.name.as_str()
                },
                device.priority
            );
        }
    }

    println!();
    if missing.is_empty() && !devices.is_empty() {
        println!("All required capabilities are available. CamScribe is ready.");
    } else {
        if !missing.is_empty() {
            println!(
                "Missing GStreamer elements: {}. Install the gstreamer good/base plugin sets.",
                missing.join(", ")
            );
        }
        if devices.is_empty() {
            println!("Connect a webcam (or load v4l2loopback) and re-run the check.");
        }
    }

    Ok(())
}

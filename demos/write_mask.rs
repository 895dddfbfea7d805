//! Generates a blue noise mask and writes it as a grayscale PNG.

use bluemask::generate_mask;
use image::{GrayImage, Luma};
use rand::{SeedableRng, rngs::SmallRng};

const WIDTH: usize = 128;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SmallRng::seed_from_u64(42);
    let mask = generate_mask(WIDTH, &mut rng)?;
    let bytes = mask.to_bytes();

    let mut image = GrayImage::new(WIDTH as u32, WIDTH as u32);
    for (index, &value) in bytes.iter().enumerate() {
        let x = (index % WIDTH) as u32;
        let y = (index / WIDTH) as u32;
        image.put_pixel(x, y, Luma([value]));
    }
    image.save("blue_noise_mask.png")?;

    println!("wrote {WIDTH}x{WIDTH} mask to blue_noise_mask.png");
    Ok(())
}

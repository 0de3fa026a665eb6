use wirebox::injectable;

pub struct Battery;

#[injectable]
impl Battery {
    #[inject]
    pub fn new() -> Battery {
        Battery
    }
}

pub struct Charger {
    _capacity: u32,
}

#[injectable]
impl Charger {
    #[inject]
    pub fn build(#[inject("capacity")] capacity: u32) -> Self {
        Self {
            _capacity: capacity,
        }
    }
}

pub struct Inverter {
    _battery: Battery,
    _charger: Charger,
}

#[injectable]
impl Inverter {
    #[inject]
    pub fn new(
        #[inject(Battery)] battery: Battery,
        #[inject("Charger")] charger: Charger,
    ) -> Self {
        Self {
            _battery: battery,
            _charger: charger,
        }
    }
}

fn main() {}

use wirebox::prelude::*;

fn main() {
    let mut container = Container::new();
    container
        .register_provider(Provider::constructor::<Engine>())
        .unwrap()
        .register_provider(Provider::constructor::<Car>())
        .unwrap()
        .register_provider_as(Provider::factory(|| Badge(String::from("GT"))), "badge")
        .unwrap();

    let car: Car = container.get(key::of::<Car>()).unwrap();
    car.drive();
}

struct Engine {
    cylinders: u32,
}

#[injectable]
impl Engine {
    #[inject]
    fn new() -> Self {
        Self { cylinders: 6 }
    }
}

struct Badge(String);

struct Car {
    engine: Engine,
    badge: Badge,
}

#[injectable]
impl Car {
    #[inject]
    fn new(#[inject(Engine)] engine: Engine, #[inject("badge")] badge: Badge) -> Self {
        Self { engine, badge }
    }

    fn drive(&self) {
        println!(
            "{} with {} cylinders, ready to go",
            self.badge.0, self.engine.cylinders
        );
    }
}

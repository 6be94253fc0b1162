use crate::sim::delay::{
    DelaySample, buffer_delay, congestion_delay, delay_floor, network_utilization, packet_delay,
    queuing_delay, system_delay, system_overhead, threshold_effect,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6 * b.abs().max(1.0)
}

#[test]
fn system_delay_bands() {
    assert_eq!(system_delay(0.0), 0.0);
    // p = 0.5
    assert!(approx(system_delay(0.04), 0.5 * 8.33));
    // p = 1.0 stays in the linear band
    assert!(approx(system_delay(0.08), 15.0));
    // p = 1.5
    assert!(approx(system_delay(0.12), 60.0 + 0.1f64.powi(3) * 225.0));
    // p = 3.75
    assert!(approx(system_delay(0.3), 300.0 + 1.55f64.powi(5) * 400.0));
}

#[test]
fn system_delay_is_monotone_in_rate() {
    let mut prev = system_delay(0.0);
    for i in 1..=400 {
        let rate = i as f64 * 0.001;
        let cur = system_delay(rate);
        assert!(cur >= prev - 1e-9, "rate {rate}: {cur} < {prev}");
        prev = cur;
    }
}

#[test]
fn congestion_delay_bands() {
    assert_eq!(congestion_delay(0.0), 0.0);
    assert_eq!(congestion_delay(0.1), 0.0);
    assert!(approx(congestion_delay(0.25), 25.0));
    assert!(approx(congestion_delay(0.4), 50.0));
    assert!(approx(congestion_delay(0.6), 100.0));
    assert!(approx(congestion_delay(1.0), 200.0));
}

#[test]
fn buffer_delay_bands() {
    assert_eq!(buffer_delay(0.0), 0.0);
    assert!(approx(buffer_delay(0.1), 1.5));
    assert!(approx(buffer_delay(0.25), 3.0));
    assert!(approx(buffer_delay(0.5), 20.0));
    assert!(approx(buffer_delay(0.75), 0.05f64.powi(2) * 500.0));
    assert!(approx(buffer_delay(1.0), 0.15f64.powi(2) * 1200.0));
}

#[test]
fn threshold_and_overhead_start_at_their_knees() {
    assert_eq!(threshold_effect(0.1), 0.0);
    assert!(approx(threshold_effect(0.15), 120.0));
    assert_eq!(system_overhead(0.12), 0.0);
    assert!(approx(system_overhead(0.24), 50.0));
}

#[test]
fn network_utilization_combines_buffers_links_and_pressure() {
    assert_eq!(network_utilization(0.0, 0.0, 0.0), 0.0);
    assert!(approx(network_utilization(0.5, 0.0, 0.0), 0.4));
    assert!(approx(network_utilization(0.0, 1.0, 0.0), 0.2));
    assert!(approx(network_utilization(0.0, 0.0, 0.15), 0.2));
    assert_eq!(network_utilization(1.0, 1.0, 1.0), 1.0);
}

#[test]
fn packet_delay_never_drops_below_floor() {
    let s = DelaySample {
        network_latency: 0.0,
        hops: 0,
        injection_rate: 0.0,
        utilization: 0.0,
        buffer_occupancy: 0.0,
    };
    assert!(approx(queuing_delay(&s), 4.0));
    assert_eq!(packet_delay(&s), delay_floor(0));
    assert_eq!(delay_floor(0), 18.0);
    assert_eq!(delay_floor(2), 24.0);
}

#[test]
fn packet_delay_light_load_example() {
    let s = DelaySample {
        network_latency: 3.0,
        hops: 2,
        injection_rate: 0.01,
        utilization: 0.01,
        buffer_occupancy: 0.0,
    };
    let multiplier = 1.0 + 0.01f64.powi(3) * 8.0;
    let queuing = 4.0 + 4.0 + 0.125 * 8.33 + 2.0 * (3.0 + 0.01f64.powi(3) * 15.0);
    let expected = (3.0 + 8.0) * multiplier + queuing;
    assert!(approx(queuing_delay(&s), queuing));
    assert!(approx(packet_delay(&s), expected));
    assert!(packet_delay(&s) > delay_floor(2));
}

#[test]
fn heavier_load_means_longer_delay() {
    let light = DelaySample {
        network_latency: 5.0,
        hops: 3,
        injection_rate: 0.02,
        utilization: 0.1,
        buffer_occupancy: 0.1,
    };
    let heavy = DelaySample {
        injection_rate: 0.2,
        utilization: 0.8,
        buffer_occupancy: 0.9,
        ..light
    };
    assert!(packet_delay(&heavy) > packet_delay(&light) * 5.0);
}

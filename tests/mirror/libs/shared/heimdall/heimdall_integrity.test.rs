/**
 * CERTIFICACIÓN: Integridad del observador Heimdall — la ignición instala
 * el suscriptor global y el hook de pánico sin colapsar la re-entrada.
 */
use dominion_shared_heimdall::init_tracing;

#[test]
fn certify_single_ignition_and_panic_shield() {
    // 1. IGNICIÓN NOMINAL
    init_tracing("dominion_heimdall_audit");

    // 2. PHOENIX SHIELD: el hook captura el pánico de un hilo secundario
    // sin derribar el arnés de pruebas.
    let survived = std::thread::spawn(|| {
        panic!("controlled strata collapse");
    })
    .join();
    assert!(survived.is_err(), "panic must propagate to the joiner after the hook runs");

    // 3. El proceso sigue operable tras la captura.
    tracing::info!("post-panic trace emitted");
}

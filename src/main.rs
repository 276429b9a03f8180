use navigator::{Action, ConfirmPrompt, Confirmer, FieldSpec, FormConfig, FormView, NavigatorError, NavigatorStatus, Notice,
                RecordNavigator};
use record::stubs::{InMemoryCrudClient, InMemoryFieldAccessor};
use record::{FieldAccessor, FieldValue, Record, RecordKey};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

/// Vista de consola: imprime avisos, resaltados y el indicador de
/// posición.
struct ConsoleView;

impl FormView for ConsoleView {
    fn notify(&self, notice: &Notice) {
        println!("[{}] {}", notice.at.format("%H:%M:%S"), notice.feedback);
    }

    fn set_action_enabled(&self, action: Action, enabled: bool) {
        log::trace!("button {} enabled={}", action, enabled);
    }

    fn highlight_fields(&self, names: &[String]) {
        if !names.is_empty() {
            println!(">> Revise los campos: {}", names.join(", "));
        }
    }

    fn show_status(&self, status: &NavigatorStatus) {
        println!("-- {} --", status);
    }
}

/// Confirmador que pregunta por stdin. Cualquier respuesta que no sea
/// "s"/"si"/"y"/"yes" cuenta como "no".
struct ConsoleConfirmer;

impl Confirmer for ConsoleConfirmer {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        match ask(&format!("{} [s/N]: ", prompt.message())) {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Pequeño menú interactivo para navegar y mantener registros sobre un
/// backend en memoria.
///
/// La configuración se lee de `FORMNAV_*` (ver `FormConfig::from_env`);
/// si no hay, se usa un formulario de grupos de ejemplo. `FORMNAV_SEED`
/// puede apuntar a un JSON con los registros iniciales.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let (config, demo) = match FormConfig::from_env() {
        Ok(cfg) => (cfg, false),
        Err(NavigatorError::Config(msg)) => {
            println!("Sin configuración ({}); usando el formulario de ejemplo.", msg);
            (demo_config(), true)
        }
        Err(e) => return Err(Box::new(e) as Box<dyn Error>),
    };
    let records = match std::env::var("FORMNAV_SEED") {
        Ok(path) => serde_json::from_str::<Vec<Record>>(&std::fs::read_to_string(path)?)?,
        Err(_) if demo => demo_records(),
        Err(_) => Vec::new(),
    };

    let backend = Arc::new(InMemoryCrudClient::with_records(&config.primary_key, records));
    let form = Arc::new(InMemoryFieldAccessor::new());
    let mut nav = RecordNavigator::new(config, backend, form.clone(), Arc::new(ConsoleView), Arc::new(ConsoleConfirmer))?;
    if let Err(e) = nav.open().await {
        eprintln!("No se pudo abrir el formulario: {}", e);
        return Ok(());
    }

    loop {
        print_form(&nav, &form);
        let actions: Vec<&str> = nav.enabled_actions().iter().map(|a| a.id()).collect();
        println!("Acciones: {} | campo | localizar | refrescar | salir", actions.join(" "));
        let choice = ask("Elige una opción: ")?;
        match choice.trim() {
            "campo" => {
                let name = ask("Campo: ")?;
                let name = name.trim();
                if !form.is_editable(name) {
                    eprintln!("El campo {} no es editable ahora", name);
                    continue;
                }
                let value = ask("Valor (enter para vacío): ")?;
                form.set_value(name, parse_input(value.trim()));
            }
            "localizar" => {
                let key = ask("Clave: ")?;
                if let Err(e) = nav.locate(&RecordKey::new(key.trim())) {
                    eprintln!("{}", e);
                }
            }
            "refrescar" => {
                if let Err(e) = nav.refresh().await {
                    eprintln!("{}", e);
                }
            }
            "salir" => {
                println!("Saliendo...");
                break;
            }
            other => match other.parse::<Action>() {
                Ok(action) => {
                    if let Err(e) = nav.dispatch(action).await {
                        log::debug!("{} failed: {}", action, e);
                    }
                    if !nav.is_open() {
                        println!("Formulario cerrado.");
                        break;
                    }
                }
                Err(e) => println!("{}", e),
            },
        }
    }

    Ok(())
}

fn demo_config() -> FormConfig {
    FormConfig::new("idgrupo").with_field(FieldSpec::new("nome").required().labeled("Nome"))
                              .with_field(FieldSpec::new("descricao").labeled("Descrição"))
}

fn demo_records() -> Vec<Record> {
    [(1, "Administradores"), (2, "Vendas"), (3, "Suporte")].iter()
                                                          .map(|(id, nome)| {
                                                              Record::new().with("idgrupo", *id)
                                                                           .with("nome", *nome)
                                                                           .with("descricao", format!("grupo {}", nome))
                                                          })
                                                          .collect()
}

fn print_form(nav: &RecordNavigator<InMemoryCrudClient>, form: &InMemoryFieldAccessor) {
    println!("\n== {} ==", nav.status());
    for spec in &nav.config().fields {
        let marker = if form.is_editable(&spec.name) { "*" } else { " " };
        println!("{}{:<14} {}", marker, spec.display_name(), form.get_value(&spec.name));
    }
}

/// Números y booleanos se guardan con su tipo; el resto como texto.
fn parse_input(raw: &str) -> FieldValue {
    if raw.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(n) = raw.parse::<f64>() {
        return FieldValue::Number(n);
    }
    match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ => FieldValue::Text(raw.to_string()),
    }
}

fn ask(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

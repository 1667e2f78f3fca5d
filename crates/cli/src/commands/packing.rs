use api_types::trip::TripId;
use trip_store::{HttpClient, packing::PackingListEditor};

use crate::{
    config::PackingAction,
    error::{AppError, Result},
    render,
};

pub async fn run(client: &HttpClient, id: TripId, action: PackingAction) -> Result<()> {
    let trip = client.trip(id).await?;

    match action {
        PackingAction::Generate => {
            let editor = PackingListEditor::generate(client, id, &trip.activities).await?;
            editor.save(client).await?;
            print!("{}", render::packing(editor.items()));
        }
        PackingAction::Add { name } => {
            let mut editor = PackingListEditor::from_trip(&trip);
            match editor.add(client, &name).await? {
                Some(item_id) => println!("Added {} ({item_id}).", name.trim()),
                None => return Err(AppError::Input("item name must not be empty".to_string())),
            }
        }
        PackingAction::Remove { item_id } => {
            let mut editor = PackingListEditor::from_trip(&trip);
            if !editor.remove(client, &item_id).await? {
                return Err(AppError::Input(format!(
                    "trip {id} has no packing item {item_id}"
                )));
            }
            println!("Removed {item_id}.");
        }
    }
    Ok(())
}
